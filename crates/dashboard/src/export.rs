//! Write a dashboard view to a directory as plain files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::page::{render_page, PageMode};
use crate::service::DashboardView;

/// Write the four SVG charts and an `index.html` embedding them into `dir`,
/// creating it if needed. Returns the written paths.
pub async fn export_view(view: &DashboardView, dir: &Path) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = Vec::with_capacity(view.charts.len() + 1);
    for (kind, svg) in &view.charts {
        let path = dir.join(kind.file_name());
        write_file(&path, svg).await?;
        written.push(path);
    }

    let index = dir.join("index.html");
    write_file(&index, &render_page(view, PageMode::Static)).await?;
    written.push(index);

    tracing::info!(
        dir = %dir.display(),
        files = written.len(),
        pair = %view.data.pair,
        "dashboard exported"
    );
    Ok(written)
}

async fn write_file(path: &Path, contents: &str) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::{sample_source, service};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_export_writes_charts_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let svc = service(Arc::new(sample_source()), 60);
        let view = svc.view(None).await.unwrap();

        let written = export_view(&view, &out).await.unwrap();
        assert_eq!(written.len(), 5);
        let names = [
            "buys-sells.svg",
            "price.svg",
            "volume.svg",
            "volume-ratio.svg",
            "index.html",
        ];
        for name in names {
            assert!(out.join(name).is_file(), "{name} missing");
        }
        let svg = std::fs::read_to_string(out.join("volume-ratio.svg")).unwrap();
        assert!(svg.contains("Volume Ratio over Time (Large Transactions)"));
    }
}
