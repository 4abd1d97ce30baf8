use ndarray::Array3;
use serde::{ser::SerializeSeq, Deserialize, Serialize, Serializer};

use crate::classify::Category;

/// Side of the square image the model expects.
pub const INPUT_SIZE: u32 = 224;
pub const CHANNELS: usize = 3;

/// 224x224x3 image scaled into [-1, 1], laid out as `[row][col][channel]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor(pub Array3<f32>);

// TF Serving wants nested lists, not ndarray's `{v, dim, data}` form.
impl Serialize for NormalizedTensor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut rows = serializer.serialize_seq(Some(self.0.len_of(ndarray::Axis(0))))?;
        for row in self.0.outer_iter() {
            let pixels: Vec<Vec<f32>> = row.outer_iter().map(|px| px.to_vec()).collect();
            rows.serialize_element(&pixels)?;
        }
        rows.end()
    }
}

/// Body of the TF Serving `:predict` call.
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a> {
    pub instances: [&'a NormalizedTensor; 1],
}

impl<'a> InferenceRequest<'a> {
    pub fn single(tensor: &'a NormalizedTensor) -> Self {
        Self { instances: [tensor] }
    }
}

#[derive(Debug, Deserialize)]
pub struct InferenceResponse {
    pub predictions: Vec<Vec<f64>>,
}

/// Payload stored by the classification API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub categoria: Category,
    pub precision: f64,
}
