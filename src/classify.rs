use serde::Serialize;
use std::fmt;

/// Carcass grade returned to the classification API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    #[serde(rename = "primera")]
    Primera,
    #[serde(rename = "segunda")]
    Segunda,
    #[serde(rename = "tercera")]
    Tercera,
    #[serde(rename = "industrial")]
    Industrial,
    Unknown,
}

impl Category {
    /// Model output index to grade. Index 3 has no label in the trained model.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Category::Primera,
            1 => Category::Segunda,
            2 => Category::Tercera,
            4 => Category::Industrial,
            _ => Category::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Primera => "primera",
            Category::Segunda => "segunda",
            Category::Tercera => "tercera",
            Category::Industrial => "industrial",
            Category::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub class_index: usize,
    pub confidence: f64,
    pub category: Category,
}

/// Picks the highest score; ties go to the lowest index. `None` for an empty vector.
pub fn classify(scores: &[f64]) -> Option<Prediction> {
    let (first, rest) = scores.split_first()?;

    let mut class_index = 0;
    let mut confidence = *first;
    for (i, &score) in rest.iter().enumerate() {
        if score > confidence {
            class_index = i + 1;
            confidence = score;
        }
    }

    Some(Prediction {
        class_index,
        confidence,
        category: Category::from_index(class_index),
    })
}
