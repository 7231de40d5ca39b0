use warehouse_csv::{
    core::row::{CsvRow, trim_to_empty},
    error::FieldError,
};

pub const HEADERS: [&str; 5] = [
    "Name",
    "Product Group",
    "Sale Price",
    "Purchase Price",
    "Article",
];

pub const FIELDS: [&str; 5] = [
    "name",
    "productGroup",
    "salePrice",
    "purchasePrice",
    "article",
];

/// A warehouse product row with a fixed set of fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub index: u64,
    pub name: Option<String>,
    pub product_group: Option<String>,
    pub purchase_price: Option<String>,
    pub sale_price: Option<String>,
    pub article: Option<String>,
}

impl Product {
    pub fn new(name: &str, product_group: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            product_group: Some(product_group.to_string()),
            ..Self::default()
        }
    }

    fn slot(&self, field: &str) -> Result<&Option<String>, FieldError> {
        match field {
            "name" => Ok(&self.name),
            "productGroup" => Ok(&self.product_group),
            "purchasePrice" => Ok(&self.purchase_price),
            "salePrice" => Ok(&self.sale_price),
            "article" => Ok(&self.article),
            _ => Err(FieldError::Unknown(field.to_string())),
        }
    }

    fn canonical(&self) -> [(&'static str, &Option<String>); 5] {
        [
            ("name", &self.name),
            ("productGroup", &self.product_group),
            ("purchasePrice", &self.purchase_price),
            ("salePrice", &self.sale_price),
            ("article", &self.article),
        ]
    }
}

impl CsvRow for Product {
    fn index(&self) -> u64 {
        self.index
    }

    fn set_index(&mut self, index: u64) {
        self.index = index;
    }

    fn set_field(&mut self, field: &str, value: Option<String>) -> Result<(), FieldError> {
        let slot = match field {
            "name" => &mut self.name,
            "productGroup" => &mut self.product_group,
            "purchasePrice" => &mut self.purchase_price,
            "salePrice" => &mut self.sale_price,
            "article" => &mut self.article,
            _ => return Err(FieldError::Unknown(field.to_string())),
        };
        *slot = value;
        Ok(())
    }

    fn field(&self, field: &str) -> Result<Option<String>, FieldError> {
        self.slot(field).cloned()
    }

    fn row_values(&self) -> Vec<String> {
        self.canonical()
            .iter()
            .map(|(_, value)| trim_to_empty(value.as_deref()))
            .collect()
    }

    fn row_values_filtered(&self, fields: &[String]) -> Vec<String> {
        self.canonical()
            .iter()
            .filter(|(name, _)| fields.iter().any(|field| field == name))
            .map(|(_, value)| trim_to_empty(value.as_deref()))
            .collect()
    }
}
