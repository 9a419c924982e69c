//! HTML page around the four charts.

use std::fmt::Write;

use px_charts::escape_xml;

use crate::service::DashboardView;

const STYLE: &str = "\
body{margin:0;padding:16px 24px;font-family:'Source Sans Pro',Helvetica,Arial,sans-serif;background:#fff;color:#262730}\
header{display:grid;grid-template-columns:1fr 1fr 1fr;align-items:end;margin-bottom:16px}\
header .middle label{display:block;font-size:14px;margin-bottom:4px}\
header select{width:100%;padding:6px;font-size:15px}\
main{display:grid;grid-template-columns:1fr 1fr;gap:16px}\
figure{margin:0}\
figure svg{width:100%;height:auto}\
footer{margin-top:12px;font-size:12px;color:#808495}";

/// How the page will be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Served by the HTTP server: the selector reloads the page.
    Live,
    /// Written to disk: the selected pair is shown as plain text.
    Static,
}

/// Wide two-by-two layout with the pair selector centred above the grid.
pub fn render_page(view: &DashboardView, mode: PageMode) -> String {
    let selected = view.data.pair.to_string();
    let mut out = String::with_capacity(64 * 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if mode == PageMode::Live && view.refresh_secs > 0 {
        let _ = writeln!(out, "<meta http-equiv=\"refresh\" content=\"{}\">", view.refresh_secs);
    }
    let _ = writeln!(out, "<title>PulseX Dashboard: {}</title>", escape_xml(&selected));
    let _ = writeln!(out, "<style>{STYLE}</style>\n</head>\n<body>");

    out.push_str("<header>\n<div></div>\n<div class=\"middle\">\n");
    match mode {
        PageMode::Live => {
            out.push_str("<form method=\"get\" action=\"/\">\n");
            out.push_str("<label for=\"pair\">Select Token Pair:</label>\n");
            out.push_str("<select id=\"pair\" name=\"pair\" onchange=\"this.form.submit()\">\n");
            for pair in &view.pairs {
                let label = escape_xml(&pair.to_string());
                let attr = if *pair == view.data.pair { " selected" } else { "" };
                let _ = writeln!(out, "<option value=\"{label}\"{attr}>{label}</option>");
            }
            out.push_str("</select>\n");
            out.push_str("<noscript><button type=\"submit\">Show</button></noscript>\n</form>\n");
        }
        PageMode::Static => {
            let _ = writeln!(
                out,
                "<label>Token Pair:</label>\n<strong>{}</strong>",
                escape_xml(&selected)
            );
        }
    }
    out.push_str("</div>\n<div></div>\n</header>\n<main>\n");

    for (kind, svg) in &view.charts {
        let id = kind.file_name().trim_end_matches(".svg");
        let _ = writeln!(out, "<figure id=\"{id}\">\n{svg}\n</figure>");
    }

    let price = view
        .data
        .latest_price()
        .map(|p| format!(", price {p} USD"))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "</main>\n<footer>{} snapshots, latest {}{}</footer>\n</body>\n</html>",
        view.data.rows,
        view.data.latest.format("%Y-%m-%d %H:%M:%S"),
        price
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::{sample_source, service};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_live_page_has_selector_and_grid() {
        let svc = service(Arc::new(sample_source()), 60);
        let view = svc.view(Some("HEX / WPLS")).await.unwrap();
        let html = render_page(&view, PageMode::Live);

        assert!(html.contains("Select Token Pair:"));
        assert!(html.contains("<option value=\"PLSX / WPLS\">PLSX / WPLS</option>"));
        assert!(html.contains("<option value=\"HEX / WPLS\" selected>HEX / WPLS</option>"));
        assert!(html.contains("onchange=\"this.form.submit()\""));
        assert!(html.contains("<meta http-equiv=\"refresh\" content=\"60\">"));
        assert_eq!(html.matches("<svg").count(), 4);
        // Grid order: buys/sells first, ratio last.
        let first = html.find("id=\"buys-sells\"").unwrap();
        let last = html.find("id=\"volume-ratio\"").unwrap();
        assert!(first < last);
    }

    #[tokio::test]
    async fn test_static_page_without_form() {
        let svc = service(Arc::new(sample_source()), 0);
        let view = svc.view(None).await.unwrap();
        let html = render_page(&view, PageMode::Static);
        assert!(!html.contains("<form"));
        assert!(!html.contains("http-equiv"));
        assert!(html.contains("<strong>PLSX / WPLS</strong>"));
        assert!(html.contains("3 snapshots, latest 2024-03-02 09:00:00"));
    }
}
