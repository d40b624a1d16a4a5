use crate::model::{Review, SalonRecord, ServiceOffering, ServiceType, Specialist};
use lazy_static::lazy_static;
use std::collections::HashSet;

/// Read-only salon collection, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    salons: Vec<SalonRecord>,
}

/// Data problems found by [`Catalog::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogIssue {
    #[error("duplicate salon id {0}")]
    DuplicateSalonId(String),
    #[error("salon {salon}: duplicate service id {service}")]
    DuplicateServiceId { salon: String, service: u32 },
    #[error("salon {salon}: duplicate specialist id {specialist}")]
    DuplicateSpecialistId { salon: String, specialist: u32 },
    #[error("salon {0} has no services; it cannot be priced")]
    NoServices(String),
    #[error("salon {salon}: rating {rating} outside 0..=5")]
    RatingOutOfRange { salon: String, rating: f64 },
    #[error("salon {salon}: discount {discount}% outside 0..=100")]
    DiscountOutOfRange { salon: String, discount: u32 },
    #[error("salon {salon}: service {service} discounted price {discount_price} exceeds price {price}")]
    DiscountAbovePrice { salon: String, service: u32, price: u32, discount_price: u32 },
    #[error("salon {salon}: service {service} has a zero price")]
    ZeroPrice { salon: String, service: u32 },
    #[error("salon {salon}: duplicate review id {review}")]
    DuplicateReviewId { salon: String, review: u32 },
    #[error("salon {salon}: review {review} rated {rating}, expected 1..=5")]
    ReviewRatingOutOfRange { salon: String, review: u32, rating: u32 },
}

impl Catalog {
    pub fn new(salons: Vec<SalonRecord>) -> Self {
        Self { salons }
    }

    pub fn records(&self) -> &[SalonRecord] {
        &self.salons
    }

    pub fn len(&self) -> usize {
        self.salons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.salons.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SalonRecord> {
        self.salons.iter().find(|s| s.id == id)
    }

    pub fn into_records(self) -> Vec<SalonRecord> {
        self.salons
    }

    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        for salon in &self.salons {
            let sid = || salon.id.clone();
            if !seen.insert(salon.id.as_str()) {
                issues.push(CatalogIssue::DuplicateSalonId(sid()));
            }
            if salon.services.is_empty() {
                issues.push(CatalogIssue::NoServices(sid()));
            }
            if !(0.0..=5.0).contains(&salon.rating) {
                issues.push(CatalogIssue::RatingOutOfRange { salon: sid(), rating: salon.rating });
            }
            if salon.discount > 100 {
                issues.push(CatalogIssue::DiscountOutOfRange { salon: sid(), discount: salon.discount });
            }
            let mut service_ids = HashSet::new();
            for service in &salon.services {
                if !service_ids.insert(service.id) {
                    issues.push(CatalogIssue::DuplicateServiceId { salon: sid(), service: service.id });
                }
                if service.price == 0 || service.discount_price == 0 {
                    issues.push(CatalogIssue::ZeroPrice { salon: sid(), service: service.id });
                }
                if service.discount_price > service.price {
                    issues.push(CatalogIssue::DiscountAbovePrice {
                        salon: sid(),
                        service: service.id,
                        price: service.price,
                        discount_price: service.discount_price,
                    });
                }
            }
            let mut specialist_ids = HashSet::new();
            for specialist in &salon.specialists {
                if !specialist_ids.insert(specialist.id) {
                    issues.push(CatalogIssue::DuplicateSpecialistId { salon: sid(), specialist: specialist.id });
                }
            }
            let mut review_ids = HashSet::new();
            for review in &salon.reviews {
                if !review_ids.insert(review.id) {
                    issues.push(CatalogIssue::DuplicateReviewId { salon: sid(), review: review.id });
                }
                if !(1..=5).contains(&review.rating) {
                    issues.push(CatalogIssue::ReviewRatingOutOfRange { salon: sid(), review: review.id, rating: review.rating });
                }
            }
        }
        issues
    }
}

impl From<Vec<SalonRecord>> for Catalog {
    fn from(salons: Vec<SalonRecord>) -> Self {
        Self::new(salons)
    }
}

lazy_static! {
    static ref MOCK: Catalog = Catalog::new(build_mock());
}

/// The built-in demo catalog.
pub fn mock_catalog() -> &'static Catalog {
    &MOCK
}

fn offering(id: u32, service_type: ServiceType, duration: u32, price: u32, discount_price: u32) -> ServiceOffering {
    ServiceOffering {
        id,
        name: service_type.label().to_string(),
        service_type,
        duration,
        price,
        discount_price,
    }
}

fn specialist(id: u32, name: &str, position: &str, experience: u32) -> Specialist {
    let first = name.split_whitespace().next().unwrap_or(name);
    Specialist {
        id,
        name: name.to_string(),
        position: position.to_string(),
        experience,
        photo: format!("/placeholder.svg?height=300&width=300&text={first}"),
    }
}

fn review(id: u32, author: &str, rating: u32, date: &str, text: &str) -> Review {
    Review {
        id,
        author: author.to_string(),
        rating,
        date: date.to_string(),
        text: text.to_string(),
    }
}

fn mock_reviews(salon: &str) -> Vec<Review> {
    match salon {
        "1" => vec![
            review(1, "Елена", 5, "15.04.2025", "Отличный массаж! Мастер Анна очень внимательна к деталям и знает своё дело."),
            review(2, "Дмитрий", 4, "10.04.2025", "Хороший салон, приятная атмосфера. Сергей помог мне с болями в спине."),
            review(3, "Ольга", 5, "05.04.2025", "Регулярно хожу на массаж в этот салон. Всегда отличный сервис и результат."),
        ],
        "2" => vec![
            review(1, "Марина", 5, "20.04.2025", "Настоящий тайский массаж, как в Бангкоке."),
            review(2, "Алексей", 5, "12.04.2025", "Сомчай творит чудеса, спина больше не болит."),
        ],
        "5" => vec![review(1, "Ксения", 4, "02.04.2025", "Хорошие программы, заметный результат после курса.")],
        "9" => vec![review(1, "Игорь", 3, "28.03.2025", "Неплохо, но долго ждал мастера.")],
        _ => Vec::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn salon(
    id: &str,
    name: &str,
    description: &str,
    address: &str,
    rating: f64,
    review_count: u32,
    discount: u32,
    services: Vec<ServiceOffering>,
    specialists: Vec<Specialist>,
) -> SalonRecord {
    SalonRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        address: address.to_string(),
        phone: format!("+7 (999) 123-45-{:02}", 60 + id.parse::<u32>().unwrap_or(0)),
        working_hours: "10:00 - 22:00".to_string(),
        rating,
        review_count,
        discount,
        image: format!("/placeholder.svg?height=400&width=600&text=Salon {id}"),
        services,
        specialists,
        reviews: mock_reviews(id),
    }
}

fn build_mock() -> Vec<SalonRecord> {
    use ServiceType::*;
    vec![
        salon(
            "1",
            "Салон красоты \"Релакс\"",
            "Место, где можно отдохнуть душой и телом. Натуральные масла и косметика премиум-класса.",
            "Москва, ул. Примерная, д. 15",
            4.8,
            124,
            30,
            vec![
                offering(1, Classic, 60, 2500, 1750),
                offering(2, Sports, 90, 3500, 2450),
                offering(3, Anticellulite, 60, 3000, 2100),
                offering(4, Relaxing, 90, 4000, 2800),
                offering(5, Neck, 30, 1500, 1050),
                offering(6, Foot, 30, 1200, 840),
            ],
            vec![
                specialist(1, "Анна Иванова", "Массажист", 5),
                specialist(2, "Сергей Петров", "Массажист", 7),
                specialist(3, "Мария Сидорова", "Массажист", 3),
            ],
        ),
        salon(
            "2",
            "Тайский спа \"Лотос\"",
            "Традиционный тайский массаж от мастеров из Таиланда.",
            "Москва, ул. Тверская, д. 7",
            4.9,
            211,
            15,
            vec![
                offering(1, Thai, 90, 4500, 3825),
                offering(2, Foot, 45, 2000, 1700),
                offering(3, Face, 30, 1800, 1530),
            ],
            vec![
                specialist(1, "Сомчай Вонг", "Мастер тайского массажа", 12),
                specialist(2, "Нари Чай", "Мастер тайского массажа", 8),
            ],
        ),
        salon(
            "3",
            "Студия \"Атлет\"",
            "Спортивный и восстановительный массаж для тех, кто тренируется.",
            "Москва, Ленинградский пр-т, д. 36",
            4.6,
            87,
            0,
            vec![
                offering(1, Sports, 60, 3000, 3000),
                offering(2, Classic, 60, 2200, 2200),
                offering(3, Lymphatic, 60, 3200, 3200),
            ],
            vec![specialist(1, "Игорь Смирнов", "Спортивный массажист", 10)],
        ),
        salon(
            "4",
            "Центр \"Здоровая спина\"",
            "Лечебный массаж спины и шейно-воротниковой зоны.",
            "Санкт-Петербург, Невский пр-т, д. 88",
            4.7,
            156,
            20,
            vec![
                offering(1, Neck, 30, 1600, 1280),
                offering(2, Classic, 60, 2400, 1920),
                offering(3, Children, 40, 1800, 1440),
            ],
            vec![
                specialist(1, "Ольга Кузнецова", "Медицинский массажист", 15),
                specialist(2, "Дмитрий Орлов", "Массажист", 4),
            ],
        ),
        salon(
            "5",
            "Beauty Lab",
            "Антицеллюлитные программы и лимфодренаж.",
            "Москва, ул. Арбат, д. 24",
            4.3,
            64,
            50,
            vec![
                offering(1, Anticellulite, 60, 3600, 1800),
                offering(2, Lymphatic, 75, 4200, 2100),
                offering(3, Face, 30, 2000, 1000),
            ],
            vec![specialist(1, "Екатерина Волкова", "Косметолог-массажист", 6)],
        ),
        salon(
            "6",
            "Массажный кабинет \"Уют\"",
            "Небольшой кабинет у дома: классика и расслабляющие программы.",
            "Казань, ул. Баумана, д. 12",
            4.1,
            23,
            10,
            vec![offering(1, Classic, 60, 1800, 1620), offering(2, Relaxing, 60, 2000, 1800)],
            vec![specialist(1, "Алия Хасанова", "Массажист", 3)],
        ),
        salon(
            "7",
            "Spa \"Восток\"",
            "Восточные практики, тайский и стоун-массаж в атмосфере спа.",
            "Санкт-Петербург, ул. Рубинштейна, д. 5",
            4.5,
            98,
            25,
            vec![
                offering(1, Thai, 90, 5000, 3750),
                offering(2, Relaxing, 60, 3500, 2625),
                offering(3, Foot, 30, 1500, 1125),
            ],
            vec![specialist(1, "Лейла Алиева", "Спа-терапевт", 9), specialist(2, "Тимур Ахмедов", "Массажист", 5)],
        ),
        salon(
            "8",
            "Детский центр \"Малыш\"",
            "Детский массаж от сертифицированных специалистов.",
            "Москва, ул. Профсоюзная, д. 40",
            4.9,
            45,
            0,
            vec![offering(1, Children, 30, 1500, 1500), offering(2, Classic, 45, 2000, 2000)],
            vec![specialist(1, "Наталья Белова", "Детский массажист", 11)],
        ),
        salon(
            "9",
            "Салон \"Гармония\"",
            "Релаксирующий массаж и ароматерапия.",
            "Новосибирск, Красный пр-т, д. 17",
            3.9,
            31,
            5,
            vec![offering(1, Relaxing, 90, 2800, 2660), offering(2, Face, 30, 1200, 1140)],
            vec![specialist(1, "Вера Морозова", "Массажист", 2)],
        ),
        salon(
            "10",
            "Клиника \"Медицина движения\"",
            "Массаж в составе реабилитационных программ.",
            "Москва, ул. Новый Арбат, д. 11",
            4.4,
            72,
            35,
            vec![
                offering(1, Classic, 60, 3000, 1950),
                offering(2, Sports, 60, 3500, 2275),
                offering(3, Neck, 30, 1800, 1170),
                offering(4, Lymphatic, 60, 3800, 2470),
            ],
            vec![specialist(1, "Павел Соколов", "Реабилитолог", 14), specialist(2, "Ирина Лебедева", "Массажист", 6)],
        ),
        salon(
            "11",
            "Студия \"Лицо\"",
            "Скульптурный и лимфодренажный массаж лица.",
            "Екатеринбург, ул. Малышева, д. 51",
            4.2,
            39,
            0,
            vec![offering(1, Face, 45, 2500, 2500), offering(2, Lymphatic, 45, 2700, 2700)],
            vec![specialist(1, "Дарья Новикова", "Косметолог", 4)],
        ),
        salon(
            "12",
            "Wellness \"Баланс\"",
            "Массаж стоп, шейно-воротниковой зоны и общий массаж для офисных сотрудников.",
            "Москва, Пресненская наб., д. 12",
            4.6,
            118,
            40,
            vec![
                offering(1, Foot, 30, 1400, 840),
                offering(2, Neck, 30, 1600, 960),
                offering(3, Classic, 60, 2600, 1560),
            ],
            vec![specialist(1, "Антон Егоров", "Массажист", 8)],
        ),
    ]
}
