use crate::torch::Prediction;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

impl Health {
    pub const OK: Health = Health { status: "ok" };
}

/// Error body, `{"detail": ...}`
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: &'static str,
}

impl ErrorDetail {
    pub const INVALID_IMAGE: ErrorDetail = ErrorDetail {
        detail: "Invalid image file",
    };
    pub const INTERNAL: ErrorDetail = ErrorDetail {
        detail: "Internal Server Error",
    };
}

/// A prediction as returned to the client
#[derive(Debug, Serialize, PartialEq)]
pub struct PredictResponse {
    pub class_id: u8,
    pub class_name: &'static str,
    /// Probability of `class_id`, rounded to 2 decimals
    pub confidence: f64,
    pub message: &'static str,
}

/// Two decimals, exact ties to even
fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        let class = prediction.class;
        PredictResponse {
            class_id: class.id(),
            class_name: class.name(),
            confidence: round2(prediction.confidence),
            message: class.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::BodyClass;

    #[test]
    fn test_rounding_happens_after_selection() {
        let response: PredictResponse = Prediction {
            class: BodyClass::Overweight,
            confidence: 0.4049,
        }
        .into();
        assert_eq!(response.class_id, 2);
        assert_eq!(response.class_name, "overweight");
        assert_eq!(response.confidence, 0.4);

        let response: PredictResponse = Prediction {
            class: BodyClass::Underweight,
            confidence: 0.996,
        }
        .into();
        assert_eq!(response.confidence, 1.0);
    }

    #[test]
    fn test_ties_round_to_even() {
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(0.8214), 0.82);
        assert_eq!(round2(1.0), 1.0);
    }

    #[test]
    fn test_serialize() {
        let response: PredictResponse = Prediction {
            class: BodyClass::Normal,
            confidence: 0.8214,
        }
        .into();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "class_id": 1,
                "class_name": "normal",
                "confidence": 0.82,
                "message": "คุณมีน้ำหนักอยู่ในเกณฑ์ปกติ 👍",
            })
        );
    }
}
