use crate::{core::transform::TransformChain, error::InvalidSchema};

/// Expected headers of a document together with the positional field bindings and per-column
/// transforms used to decode it.
///
/// `bindings[i]` names the record field filled from CSV column `i`; `None` skips the column.
/// The number of bindings always equals the number of headers, and so does the number of
/// transform chains unless there are none at all.
///
/// # Examples
///
/// ```
/// use warehouse_csv::core::schema::CsvSchemaBuilder;
/// use warehouse_csv::core::transform::{TransformChain, UpperCase};
///
/// let schema = CsvSchemaBuilder::new()
///     .column("Name", "name")
///     .column_with("Product Group", "productGroup", TransformChain::of(UpperCase))
///     .skip("Comment")
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.headers(), ["Name", "Product Group", "Comment"]);
/// assert_eq!(schema.binding(2), None);
/// ```
#[derive(Debug, Clone)]
pub struct CsvSchema {
    headers: Vec<String>,
    bindings: Vec<Option<String>>,
    transforms: Vec<TransformChain>,
}

impl CsvSchema {
    /// Schema where every column is bound.
    pub fn new<H, F>(headers: &[H], fields: &[F]) -> Result<Self, InvalidSchema>
    where
        H: AsRef<str>,
        F: AsRef<str>,
    {
        Self::with_bindings(
            headers.iter().map(|h| h.as_ref().to_string()).collect(),
            fields.iter().map(|f| Some(f.as_ref().to_string())).collect(),
        )
    }

    pub fn with_bindings(
        headers: Vec<String>,
        bindings: Vec<Option<String>>,
    ) -> Result<Self, InvalidSchema> {
        if headers.len() != bindings.len() {
            return Err(InvalidSchema::BindingCount {
                headers: headers.len(),
                bindings: bindings.len(),
            });
        }
        Ok(CsvSchema {
            headers,
            bindings,
            transforms: Vec::new(),
        })
    }

    /// Attaches one transform chain per column.
    pub fn transforms(mut self, transforms: Vec<TransformChain>) -> Result<Self, InvalidSchema> {
        if !transforms.is_empty() && transforms.len() != self.headers.len() {
            return Err(InvalidSchema::TransformCount {
                headers: self.headers.len(),
                transforms: transforms.len(),
            });
        }
        self.transforms = transforms;
        Ok(self)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn bindings(&self) -> &[Option<String>] {
        &self.bindings
    }

    pub fn binding(&self, column: usize) -> Option<&str> {
        self.bindings.get(column).and_then(|b| b.as_deref())
    }

    /// Transform chain for a column, `None` when the schema carries none.
    pub fn transform(&self, column: usize) -> Option<&TransformChain> {
        self.transforms.get(column)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Column-by-column builder for a [`CsvSchema`].
///
/// Columns added without a chain get the identity chain as soon as any column has one.
#[derive(Debug, Default)]
pub struct CsvSchemaBuilder {
    headers: Vec<String>,
    bindings: Vec<Option<String>>,
    transforms: Vec<Option<TransformChain>>,
}

impl CsvSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(self, header: &str, field: &str) -> Self {
        self.push(header, Some(field), None)
    }

    pub fn column_with(self, header: &str, field: &str, transform: TransformChain) -> Self {
        self.push(header, Some(field), Some(transform))
    }

    /// A column that must be present in the file but is not read into the record.
    pub fn skip(self, header: &str) -> Self {
        self.push(header, None, None)
    }

    fn push(
        mut self,
        header: &str,
        field: Option<&str>,
        transform: Option<TransformChain>,
    ) -> Self {
        self.headers.push(header.to_string());
        self.bindings.push(field.map(str::to_string));
        self.transforms.push(transform);
        self
    }

    pub fn build(self) -> Result<CsvSchema, InvalidSchema> {
        let schema = CsvSchema::with_bindings(self.headers, self.bindings)?;
        if self.transforms.iter().all(Option::is_none) {
            return Ok(schema);
        }
        schema.transforms(
            self.transforms
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect(),
        )
    }
}
