use super::load_catalog;
use crate::cli::AttributesArgs;
use crate::error::Result;
use simreport::core::catalog::AttributeDescriptor;
use tracing::info;

pub fn run(args: AttributesArgs) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let rows = listing(catalog.iter(), args.standard_only);
    info!("Listing {} of {} catalog entries.", rows.len(), catalog.len());

    let width = rows.iter().map(|(code, _)| code.len()).max().unwrap_or(0);
    for (code, label) in rows {
        println!("{:<width$}  {}", code, label, width = width);
    }
    Ok(())
}

fn listing(
    entries: impl Iterator<Item = AttributeDescriptor>,
    standard_only: bool,
) -> Vec<(String, String)> {
    entries
        .filter(|d| d.standard || !standard_only)
        .map(|d| {
            let label = if d.standard {
                d.term.clone()
            } else {
                "(free text)".to_string()
            };
            (d.code, label)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use simreport::core::catalog::AttributeCatalog;

    fn catalog() -> AttributeCatalog {
        let mut catalog = AttributeCatalog::new();
        catalog.insert(AttributeDescriptor::standard("FORCE_FIELD", "Force field"));
        catalog.insert(AttributeDescriptor::free_text("LAB_NOTEBOOK"));
        catalog
    }

    #[test]
    fn lists_terms_and_marks_free_text() {
        let rows = listing(catalog().iter(), false);
        assert_eq!(
            rows,
            vec![
                ("FORCE_FIELD".to_string(), "Force field".to_string()),
                ("LAB_NOTEBOOK".to_string(), "(free text)".to_string()),
            ]
        );
    }

    #[test]
    fn standard_only_hides_free_text() {
        let rows = listing(catalog().iter(), true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "FORCE_FIELD");
    }

    #[test]
    fn builtin_catalog_is_listed_without_user_file() {
        let catalog = load_catalog(None).unwrap();
        assert!(listing(catalog.iter(), true).iter().any(|(code, _)| code == "QM_BASIS_SET"));
    }
}
