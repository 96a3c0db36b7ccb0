//! Camera product recognition.
//!
//! There is no vision model behind this: [`MockRecognizer`] stands in for
//! one with the same success rate and value ranges the app was built against.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::product::ProductId;
use crate::domain::scan::{BoundingBox, ScanResult};
use crate::errors::ApplicationError;

pub const MOCK_SUCCESS_RATE: f64 = 0.7;
pub const MOCK_PRODUCT_ID_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

#[async_trait]
pub trait RecognitionProvider: Send + Sync {
    /// `Ok(None)` means nothing was recognized in the frame.
    async fn recognize(&self, image: &[u8]) -> Result<Option<ScanResult>, ApplicationError>;
}

#[derive(Debug)]
pub struct MockRecognizer {
    rng: Mutex<StdRng>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    /// Deterministic sequence of results, for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecognitionProvider for MockRecognizer {
    async fn recognize(&self, _image: &[u8]) -> Result<Option<ScanResult>, ApplicationError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ApplicationError::Integration("recognizer rng is poisoned".to_string()))?;

        if !rng.gen_bool(MOCK_SUCCESS_RATE) {
            return Ok(None);
        }

        let product_id = rng.gen_range(MOCK_PRODUCT_ID_RANGE);
        Ok(Some(ScanResult {
            product_id: Some(ProductId(product_id.to_string())),
            confidence: rng.gen_range(0.85..1.0),
            bounding_box: BoundingBox {
                x: rng.gen_range(50.0..150.0),
                y: rng.gen_range(50.0..150.0),
                width: rng.gen_range(200.0..300.0),
                height: rng.gen_range(200.0..300.0),
            },
        }))
    }
}
