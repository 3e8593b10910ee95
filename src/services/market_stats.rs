//! Cache directory statistics for the `status` command.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Summary of one symbol's cache file.
#[derive(Debug, Clone)]
pub struct CacheFileInfo {
    pub symbol: String,
    pub rows: usize,
    pub first_date: String,
    pub last_date: String,
    pub last_close: f64,
}

/// Overall cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_symbols: usize,
    pub has_data: bool,
}

/// Count cached symbols without reading file contents.
pub fn get_cache_stats(dir: &Path) -> Result<CacheStats> {
    if !dir.exists() {
        return Ok(CacheStats {
            total_symbols: 0,
            has_data: false,
        });
    }

    let count = fs::read_dir(dir)
        .map_err(|e| Error::Io(format!("Failed to read cache dir: {}", e)))?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "csv"))
        .count();

    Ok(CacheStats {
        total_symbols: count,
        has_data: count > 0,
    })
}

/// Per-file summaries, sorted by symbol.
pub fn cache_overview(dir: &Path) -> Result<Vec<CacheFileInfo>> {
    let stats = get_cache_stats(dir)?;
    if !stats.has_data {
        return Ok(Vec::new());
    }

    let mut infos = Vec::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| Error::Io(format!("Failed to read cache dir: {}", e)))?
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "csv") {
            continue;
        }
        if let Some(info) = read_file_info(&path)? {
            infos.push(info);
        }
    }

    infos.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    Ok(infos)
}

fn read_file_info(path: &Path) -> Result<Option<CacheFileInfo>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("Failed to read cache file: {}", e)))?;
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= 1 {
        return Ok(None);
    }

    let symbol = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("?")
        .trim_end_matches("_latest")
        .to_string();

    let first_line = lines.get(1).unwrap_or(&"");
    let last_line = lines.last().unwrap_or(&"");

    Ok(Some(CacheFileInfo {
        symbol,
        rows: lines.len() - 1,
        first_date: extract_date(first_line),
        last_date: extract_date(last_line),
        last_close: extract_close(last_line),
    }))
}

/// Date portion of a cache row (`datetime,open,high,low,close,volume`).
fn extract_date(line: &str) -> String {
    line.split(',')
        .next()
        .and_then(|dt| dt.split_whitespace().next())
        .unwrap_or("N/A")
        .to_string()
}

fn extract_close(line: &str) -> f64 {
    line.split(',').nth(4).and_then(|v| v.parse().ok()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_date_and_close() {
        let line = "2025-03-28 09:15:00,100.1,101.2,99.3,100.5,12345";
        assert_eq!(extract_date(line), "2025-03-28");
        assert_eq!(extract_close(line), 100.5);

        assert_eq!(extract_date(""), "N/A");
        assert_eq!(extract_close("a,b"), 0.0);
    }

    #[test]
    fn test_missing_dir_has_no_data() {
        let stats = get_cache_stats(Path::new("does/not/exist")).unwrap();
        assert_eq!(stats.total_symbols, 0);
        assert!(!stats.has_data);
        assert!(cache_overview(Path::new("does/not/exist")).unwrap().is_empty());
    }
}
