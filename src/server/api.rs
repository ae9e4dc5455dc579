use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coordinates::Coordinates;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Coordinates arrive as strings, exactly as typed, so validation
/// happens in one place for every front end.
#[derive(Debug, Deserialize)]
pub struct DescribeRequest {
    pub ra: Option<String>,
    pub dec: Option<String>,
    pub place: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DescribeResponse {
    pub coordinates: Coordinates,
    pub description: String,
    pub objects: Vec<String>,
    pub annotated_image_url: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceResponse {
    pub name: String,
    pub ra: f64,
    pub dec: f64,
}
