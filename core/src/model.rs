use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type SalonId = String;

/// Fixed vocabulary of massage service tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Classic,
    Sports,
    Anticellulite,
    Relaxing,
    Neck,
    Foot,
    Thai,
    Lymphatic,
    Children,
    Face,
}

impl ServiceType {
    pub const ALL: [ServiceType; 10] = [
        ServiceType::Classic,
        ServiceType::Sports,
        ServiceType::Anticellulite,
        ServiceType::Relaxing,
        ServiceType::Neck,
        ServiceType::Foot,
        ServiceType::Thai,
        ServiceType::Lymphatic,
        ServiceType::Children,
        ServiceType::Face,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Classic => "classic",
            ServiceType::Sports => "sports",
            ServiceType::Anticellulite => "anticellulite",
            ServiceType::Relaxing => "relaxing",
            ServiceType::Neck => "neck",
            ServiceType::Foot => "foot",
            ServiceType::Thai => "thai",
            ServiceType::Lymphatic => "lymphatic",
            ServiceType::Children => "children",
            ServiceType::Face => "face",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::Classic => "Классический массаж",
            ServiceType::Sports => "Спортивный массаж",
            ServiceType::Anticellulite => "Антицеллюлитный массаж",
            ServiceType::Relaxing => "Релаксирующий массаж",
            ServiceType::Neck => "Массаж шейно-воротниковой зоны",
            ServiceType::Foot => "Массаж стоп",
            ServiceType::Thai => "Тайский массаж",
            ServiceType::Lymphatic => "Лимфодренажный массаж",
            ServiceType::Children => "Детский массаж",
            ServiceType::Face => "Массаж лица",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service type: {0}")]
pub struct UnknownServiceType(pub String);

impl FromStr for ServiceType {
    type Err = UnknownServiceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownServiceType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    /// Duration in minutes.
    pub duration: u32,
    pub price: u32,
    pub discount_price: u32,
}

impl ServiceOffering {
    /// Per-service discount, rounded to a whole percent.
    pub fn discount_percent(&self) -> u32 {
        if self.price == 0 {
            return 0;
        }
        let saved = self.price.saturating_sub(self.discount_price) as f64;
        (saved / self.price as f64 * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialist {
    pub id: u32,
    pub name: String,
    pub position: String,
    /// Years of experience.
    pub experience: u32,
    pub photo: String,
}

/// Client review shown on the salon page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u32,
    pub author: String,
    /// Whole stars, 1..=5.
    pub rating: u32,
    /// As displayed, `DD.MM.YYYY`.
    pub date: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalonRecord {
    pub id: SalonId,
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub working_hours: String,
    pub rating: f64,
    pub review_count: u32,
    /// Salon-wide discount percentage, 0..=100.
    pub discount: u32,
    pub image: String,
    pub services: Vec<ServiceOffering>,
    pub specialists: Vec<Specialist>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl SalonRecord {
    /// Cheapest discounted price, `None` when the salon lists no services.
    pub fn min_price(&self) -> Option<u32> {
        self.services.iter().map(|s| s.discount_price).min()
    }

    /// Most expensive discounted price, `None` when the salon lists no services.
    pub fn max_price(&self) -> Option<u32> {
        self.services.iter().map(|s| s.discount_price).max()
    }

    pub fn offers(&self, service_type: &str) -> bool {
        self.services
            .iter()
            .any(|s| s.service_type.as_str().eq_ignore_ascii_case(service_type))
    }

    pub fn service(&self, id: u32) -> Option<&ServiceOffering> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn specialist(&self, id: u32) -> Option<&Specialist> {
        self.specialists.iter().find(|s| s.id == id)
    }

    /// Numeric form of the identifier used by relevance ordering.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.trim().parse().ok()
    }

    pub fn summary(&self) -> SalonSummary {
        SalonSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            rating: self.rating,
            review_count: self.review_count,
            discount: self.discount,
            image: self.image.clone(),
            min_price: self.min_price(),
            max_service_discount: self.services.iter().map(|s| s.discount_percent()).max(),
        }
    }
}

/// Card view of a salon in a result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalonSummary {
    pub id: SalonId,
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub review_count: u32,
    pub discount: u32,
    pub image: String,
    pub min_price: Option<u32>,
    pub max_service_discount: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offering(id: u32, price: u32, discount_price: u32) -> ServiceOffering {
        ServiceOffering {
            id,
            name: format!("service {id}"),
            service_type: ServiceType::Classic,
            duration: 60,
            price,
            discount_price,
        }
    }

    #[test]
    fn service_type_parses_case_insensitively() {
        assert_eq!("Thai".parse::<ServiceType>().unwrap(), ServiceType::Thai);
        assert!("hot-stone".parse::<ServiceType>().is_err());
    }

    #[test]
    fn service_discount_is_rounded() {
        assert_eq!(offering(1, 2500, 1750).discount_percent(), 30);
        assert_eq!(offering(2, 3000, 2000).discount_percent(), 33);
        assert_eq!(offering(3, 0, 0).discount_percent(), 0);
    }

    #[test]
    fn price_bounds_are_undefined_without_services() {
        let mut salon = crate::catalog::mock_catalog().records()[0].clone();
        salon.services.clear();
        assert_eq!(salon.min_price(), None);
        assert_eq!(salon.max_price(), None);
        assert_eq!(salon.summary().min_price, None);
    }

    #[test]
    fn salon_serializes_with_camel_case_keys() {
        let salon = &crate::catalog::mock_catalog().records()[0];
        let json = serde_json::to_value(salon).unwrap();
        assert!(json.get("workingHours").is_some());
        assert!(json.get("reviewCount").is_some());
        assert_eq!(json["services"][0]["type"], "classic");
        assert_eq!(json["reviews"][0]["author"], "Елена");
    }

    #[test]
    fn reviews_default_to_empty() {
        let mut json = serde_json::to_value(&crate::catalog::mock_catalog().records()[0]).unwrap();
        json.as_object_mut().unwrap().remove("reviews");
        let salon: SalonRecord = serde_json::from_value(json).unwrap();
        assert!(salon.reviews.is_empty());
    }
}
