//! Synthetic row generators used by the admin seed operation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::types::{
    Category, ChatMessage, Gender, MaritalStatus, Store, StoreEmployee, StoreEmployeeRole,
    UserProfile,
};

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bogdan", "Carla", "Dan", "Elena", "Florin", "Gabriela", "Horia", "Ioana", "Jo",
    "Kevin", "Laura", "Mihai", "Nora", "Oscar", "Paula", "Radu", "Sofia", "Tudor", "Vlad",
];

const LAST_NAMES: &[&str] = &[
    "Popescu", "Ionescu", "Smith", "Garcia", "Muller", "Rossi", "Dubois", "Novak", "Silva",
    "Kowalski", "Jensen", "Nagy", "Moreau", "Costa", "Weber",
];

const STORE_ADJECTIVES: &[&str] = &[
    "Golden", "Urban", "Happy", "Corner", "Prime", "Northern", "Bright", "Little", "Grand", "Blue",
];

const STORE_NOUNS: &[&str] = &[
    "Market", "Emporium", "Outlet", "Depot", "Boutique", "Bazaar", "Shop", "Gallery", "Mart",
];

const STREETS: &[&str] = &[
    "Main St", "Oak Avenue", "Victory Blvd", "Station Rd", "Park Lane", "River St", "Hill Road",
];

const CITIES: &[(&str, &str, &str)] = &[
    ("Cluj-Napoca", "Cluj", "Romania"),
    ("Bucharest", "Ilfov", "Romania"),
    ("Austin", "Texas", "United States"),
    ("Portland", "Oregon", "United States"),
    ("Lyon", "Auvergne-Rhone-Alpes", "France"),
    ("Munich", "Bavaria", "Germany"),
    ("Porto", "Norte", "Portugal"),
];

const ROLE_NAMES: &[&str] = &[
    "Cashier", "Stocker", "Supervisor", "Manager", "Security", "Cleaner", "Accountant", "Clerk",
];

const LOCATIONS: &[&str] = &["Home", "Office", "Downtown", "Suburbs", "Countryside"];

const CHAT_LINES: &[&str] = &[
    "Morning everyone!",
    "Who is covering the late shift?",
    "Inventory count is done.",
    "New delivery arrived at the back door.",
    "Remember the meeting at noon.",
];

fn pick<'a, R: Rng>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn random_date<R: Rng>(rng: &mut R, from_year: i32, to_year: i32) -> DateTime<Utc> {
    let start = Utc
        .with_ymd_and_hms(from_year, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let span_days = i64::from((to_year - from_year).max(1)) * 365;
    start + Duration::days(rng.gen_range(0..span_days))
}

pub fn user_name<R: Rng>(rng: &mut R) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", pick(rng, FIRST_NAMES).to_lowercase(), &suffix[..8])
}

pub fn user_profile<R: Rng>(rng: &mut R, user_id: i64) -> UserProfile {
    let mut profile = UserProfile::new(user_id);
    profile.bio = Some(format!("Works with {}.", pick(rng, STORE_NOUNS).to_lowercase()));
    profile.birthday = Some(random_date(rng, 1960, 2004));
    profile.gender = *Gender::ALL.choose(rng).unwrap_or(&Gender::Other);
    profile.marital_status = *MaritalStatus::ALL
        .choose(rng)
        .unwrap_or(&MaritalStatus::Single);
    profile.location = Some(pick(rng, LOCATIONS).to_string());
    profile
}

pub fn store<R: Rng>(rng: &mut R, owner_id: Option<i64>) -> Store {
    let (city, state, country) = CITIES.choose(rng).copied().unwrap_or(CITIES[0]);
    let open_date = random_date(rng, 1990, 2022);
    let close_date = rng
        .gen_bool(0.1)
        .then(|| open_date + Duration::days(rng.gen_range(30..3650)));

    Store {
        id: 0,
        name: format!("{} {}", pick(rng, STORE_ADJECTIVES), pick(rng, STORE_NOUNS)),
        description: Some(format!("A store in {city}")),
        address: Some(format!("{} {}", rng.gen_range(1..400), pick(rng, STREETS))),
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        zip_code: Some(format!("{:05}", rng.gen_range(10000..99999))),
        country: Some(country.to_string()),
        category: *Category::ALL.choose(rng).unwrap_or(&Category::Other),
        open_date: Some(open_date),
        close_date,
        user_id: owner_id,
    }
}

pub fn store_employee_role<R: Rng>(rng: &mut R, owner_id: Option<i64>) -> StoreEmployeeRole {
    let name = pick(rng, ROLE_NAMES);
    StoreEmployeeRole {
        id: 0,
        name: name.to_string(),
        description: Some(format!("{name} duties")),
        role_level: rng.gen_range(1..=10),
        user_id: owner_id,
    }
}

pub fn store_employee<R: Rng>(
    rng: &mut R,
    role_ids: &[i64],
    owner_id: Option<i64>,
) -> StoreEmployee {
    let employment_date = random_date(rng, 2000, 2023);
    let termination_date = rng
        .gen_bool(0.15)
        .then(|| employment_date + Duration::days(rng.gen_range(30..2000)));

    StoreEmployee {
        id: 0,
        first_name: pick(rng, FIRST_NAMES).to_string(),
        last_name: pick(rng, LAST_NAMES).to_string(),
        gender: *Gender::ALL.choose(rng).unwrap_or(&Gender::Other),
        employment_date: Some(employment_date),
        termination_date,
        salary: f64::from(rng.gen_range(1_500_u32..12_000)),
        store_employee_role_id: role_ids.choose(rng).copied(),
        user_id: owner_id,
    }
}

/// Returns a (start, end) pair with end after start.
pub fn shift_window<R: Rng>(rng: &mut R) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = random_date(rng, 2020, 2024);
    let end = start + Duration::hours(rng.gen_range(4..=12));
    (start, end)
}

pub fn chat_message<R: Rng>(rng: &mut R) -> ChatMessage {
    ChatMessage {
        id: 0,
        nickname: pick(rng, FIRST_NAMES).to_string(),
        message: pick(rng, CHAT_LINES).to_string(),
        timestamp: Some(random_date(rng, 2023, 2024)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_rows_are_consistent() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let store = store(&mut rng, Some(1));
            assert!(!store.name.is_empty());
            if let (Some(open), Some(close)) = (store.open_date, store.close_date) {
                assert!(close > open);
            }

            let employee = store_employee(&mut rng, &[7, 8], None);
            assert!(employee.salary >= 1_500.0);
            assert!(matches!(employee.store_employee_role_id, Some(7 | 8)));

            let (start, end) = shift_window(&mut rng);
            assert!(end > start);
        }
    }

    #[test]
    fn test_employee_without_roles_has_no_role() {
        let mut rng = rand::thread_rng();
        let employee = store_employee(&mut rng, &[], Some(3));
        assert_eq!(employee.store_employee_role_id, None);
        assert_eq!(employee.user_id, Some(3));
    }
}
