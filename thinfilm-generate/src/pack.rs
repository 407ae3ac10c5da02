use std::path::Path;

use anyhow::{Context, Result};
use thinfilm::{Spline, parse_nk_table};
use thinfilm_data::NkTable;

/// Read every regular file in `dir` as an nk table.
///
/// Files that do not yield a usable spline are skipped with a warning.
/// Tables come back sorted by name.
pub fn collect_tables(dir: &Path) -> Result<Vec<NkTable>> {
    let mut tables = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if !path.is_file() || name.starts_with('.') {
            continue;
        }

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                continue;
            }
        };
        let table = parse_nk_table(&name, &text);
        if let Err(e) = Spline::fit(&table.energy_ev, &table.n) {
            log::warn!("skipping {name}: {e}");
            continue;
        }
        tables.push(table);
    }
    tables.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_skips_unusable_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b-Si"), "1 3.5 0\n2 3.9 0\n3 5.0 0.1\n").unwrap();
        std::fs::write(dir.path().join("a-SiO2"), "1 1.45 0\n2 1.46 0\n3 1.47 0\n").unwrap();
        std::fs::write(dir.path().join("broken"), "# only a comment\n").unwrap();
        std::fs::write(dir.path().join(".hidden"), "1 1 0\n2 1 0\n3 1 0\n").unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let tables = collect_tables(dir.path()).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a-SiO2", "b-Si"]);
        assert_eq!(tables[1].k, vec![0.0, 0.0, 0.1]);
    }
}
