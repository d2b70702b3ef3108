/// Most products a reply ever shows; one carousel bubble each.
pub const MAX_ITEMS: usize = 3;

/// A product as the reply needs it. Built by the search adapter's validating
/// parse; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub name: String,
    /// Price in whole yen.
    pub price: u64,
    /// Absolute product page URL.
    pub url: String,
    /// Absolute URL of the first product image.
    pub image_url: String,
}

/// Search results in the API's own order, never more than [`MAX_ITEMS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductList(Vec<ProductRecord>);

impl ProductList {
    /// Keep the first [`MAX_ITEMS`] records, dropping the rest.
    pub fn truncated(mut records: Vec<ProductRecord>) -> Self {
        records.truncate(MAX_ITEMS);
        Self(records)
    }

    pub fn get(&self, slot: usize) -> Option<&ProductRecord> {
        self.0.get(slot)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductRecord> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ProductList {
    type Item = &'a ProductRecord;
    type IntoIter = std::slice::Iter<'a, ProductRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
