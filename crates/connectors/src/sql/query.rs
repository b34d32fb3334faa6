use model::spec::TableSpec;

/// Builds the two SELECT statements one export run needs: every column of
/// the table plus the coordinate pair aliased to `x`/`y`, split by whether
/// the x column is populated.
///
/// The table and column names are interpolated into the SQL text as-is.
/// Nothing here quotes, escapes or validates them; the caller vouches for
/// them. The statements carry no user-supplied values, only identifiers.
pub struct SelectSplit<'a> {
    spec: &'a TableSpec,
}

impl<'a> SelectSplit<'a> {
    pub fn new(spec: &'a TableSpec) -> Self {
        SelectSplit { spec }
    }

    /// Rows whose x column is populated; the geometry-bearing subset.
    pub fn with_coordinates(&self) -> String {
        self.select("IS NOT NULL")
    }

    /// Rows whose x column is NULL; the attribute-only subset.
    pub fn without_coordinates(&self) -> String {
        self.select("IS NULL")
    }

    /// Both statements, in the order the pipeline runs them.
    pub fn statements(&self) -> (String, String) {
        (self.with_coordinates(), self.without_coordinates())
    }

    fn select(&self, null_check: &str) -> String {
        format!(
            "SELECT *, {x} AS x, {y} AS y FROM {table} WHERE {x} {null_check};",
            x = self.spec.x_column,
            y = self.spec.y_column,
            table = self.spec.table,
        )
    }
}
