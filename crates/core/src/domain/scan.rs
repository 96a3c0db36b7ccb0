use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Output of the recognition collaborator for one camera frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub product_id: Option<ProductId>,
    /// Recognition confidence in `[0, 1]`.
    pub confidence: f64,
    pub bounding_box: BoundingBox,
}

impl ScanResult {
    /// Product worth tracking as a view, if the match clears `threshold`.
    pub fn confident_product(&self, threshold: f64) -> Option<&ProductId> {
        self.product_id.as_ref().filter(|_| self.confidence >= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, ScanResult};
    use crate::domain::product::ProductId;

    fn scan(product_id: Option<&str>, confidence: f64) -> ScanResult {
        ScanResult {
            product_id: product_id.map(ProductId::new),
            confidence,
            bounding_box: BoundingBox { x: 0.0, y: 0.0, width: 10.0, height: 10.0 },
        }
    }

    #[test]
    fn confident_product_requires_id_and_threshold() {
        assert_eq!(scan(Some("2"), 0.9).confident_product(0.75), Some(&ProductId::new("2")));
        assert_eq!(scan(Some("2"), 0.5).confident_product(0.75), None);
        assert_eq!(scan(None, 0.99).confident_product(0.75), None);
    }
}
