use dbapi_api::{CatalogEntry, RoutineKind};

/// Functions and views outside the system schemas. Functions that belong to
/// an extension are skipped; they are not part of the application's API.
pub const CATALOG_SQL: &str = "\
SELECT n.nspname AS api_namespace,
       p.proname AS api_name,
       'function' AS api_type,
       pg_get_function_arguments(p.oid) AS api_params
  FROM pg_proc p
  JOIN pg_namespace n ON n.oid = p.pronamespace
 WHERE p.prokind = 'f'
   AND n.nspname NOT IN ('pg_catalog', 'information_schema')
   AND n.nspname NOT LIKE 'pg\\_toast%'
   AND NOT EXISTS (
       SELECT 1 FROM pg_depend d
        WHERE d.classid = 'pg_proc'::regclass
          AND d.objid = p.oid
          AND d.deptype = 'e')
UNION ALL
SELECT v.schemaname, v.viewname, 'view', ''
  FROM pg_views v
 WHERE v.schemaname NOT IN ('pg_catalog', 'information_schema')
ORDER BY 1, 2";

/// Build an entry from one catalog row (`api_namespace`, `api_name`,
/// `api_type`, `api_params`). Rows with missing names or an unknown type
/// are skipped.
pub fn entry_from_columns(columns: [Option<&str>; 4]) -> Option<CatalogEntry> {
    let [Some(schema), Some(name), Some(kind), args] = columns else {
        return None;
    };
    let kind = match kind {
        "function" => RoutineKind::Function,
        "view" => RoutineKind::View,
        other => {
            tracing::warn!(schema, name, kind = other, "skipping catalog row of unknown type");
            return None;
        }
    };
    Some(CatalogEntry {
        schema: schema.to_owned(),
        name: name.to_owned(),
        kind,
        args: args.unwrap_or_default().to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_and_view_rows() {
        let entry = entry_from_columns([Some("search"), Some("entities"), Some("function"), Some("name text")]).unwrap();
        assert_eq!(entry.kind, RoutineKind::Function);
        assert_eq!(entry.args, "name text");

        let entry = entry_from_columns([Some("cms"), Some("log_view"), Some("view"), None]).unwrap();
        assert_eq!(entry.kind, RoutineKind::View);
        assert_eq!(entry.args, "");
    }

    #[test]
    fn incomplete_or_unknown_rows_are_skipped() {
        assert!(entry_from_columns([None, Some("f"), Some("function"), None]).is_none());
        assert!(entry_from_columns([Some("s"), Some("f"), Some("aggregate"), None]).is_none());
    }
}
