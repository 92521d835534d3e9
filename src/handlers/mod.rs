//! HTTP handlers for the portal's pages and probes.
//!
//! Pages are rendered as plain HTML strings, composed from the shared shell
//! below; there is no template engine because there is barely any markup.

pub mod auth_handlers;
pub mod file_handlers;
pub mod health_handlers;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f4f6fb;color:#1f2430}\
header{background:#fff;box-shadow:0 1px 3px rgba(0,0,0,.08);padding:1rem 2rem;display:flex;justify-content:space-between;align-items:center;gap:1rem;flex-wrap:wrap}\
header h1{font-size:1.3rem;margin:0}\
header .who{color:#5b6270;font-size:.85rem;margin:.2rem 0 0}\
nav{display:flex;gap:.5rem;align-items:center}\
main{max-width:64rem;margin:2rem auto;padding:0 1rem}\
.panel{background:#fff;border-radius:.6rem;box-shadow:0 1px 4px rgba(0,0,0,.08);padding:2rem;max-width:26rem;margin:3rem auto}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(14rem,1fr));gap:1rem}\
.card{background:#fff;border:1px solid #dfe3ec;border-radius:.6rem;padding:1rem}\
.card h3{margin:.2rem 0 .6rem;font-size:1rem;word-break:break-word}\
.card .meta{color:#5b6270;font-size:.8rem;margin-bottom:.8rem}\
.card .actions{display:flex;gap:.5rem}\
.empty{text-align:center;color:#5b6270;padding:4rem 0}\
.notice{border-radius:.4rem;padding:.7rem 1rem;margin:1rem 0;font-size:.9rem}\
.notice.error{background:#fdecec;border:1px solid #f3b8b8;color:#8f1f1f}\
.notice.success{background:#eaf7ec;border:1px solid #b5ddba;color:#1f6a2c}\
.button,button{display:inline-block;background:#2456d6;color:#fff;border:0;border-radius:.4rem;padding:.5rem .9rem;font-size:.9rem;text-decoration:none;cursor:pointer}\
button.danger{background:#c22d2d}\
.button.secondary{background:#e5e9f2;color:#1f2430}\
input[type=text]{width:100%;box-sizing:border-box;padding:.6rem;border:1px solid #c7cdda;border-radius:.4rem;font-size:1rem}\
input[type=file]{margin:1rem 0;width:100%}\
label{display:block;font-size:.85rem;margin-bottom:.4rem}\
.hint{color:#5b6270;font-size:.75rem;margin-top:.4rem}";

/// Wrap a page body in the shared HTML shell.
pub(crate) fn page(title: &str, body: &str) -> String {
    format!(
        concat!(
            "<!doctype html><html lang=\"en\"><head>",
            "<meta charset=\"utf-8\">",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            "<title>{title} · Student PDF Portal</title>",
            "<style>{style}</style>",
            "</head><body>{body}</body></html>"
        ),
        title = html_escape(title),
        style = STYLE,
        body = body
    )
}

/// Inline status message, `kind` being `error` or `success`.
pub(crate) fn notice(kind: &str, text: &str) -> String {
    format!(
        r#"<p class="notice {kind}">{}</p>"#,
        html_escape(text)
    )
}

pub(crate) fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape_covers_markup_characters() {
        assert_eq!(
            html_escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_notice_escapes_its_text() {
        let rendered = notice("error", "<script>");
        assert!(rendered.contains("&lt;script&gt;"));
        assert!(!rendered.contains("<script>"));
    }
}
