use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use encart_shared::Masked;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CoreError, CoreResult};

const ID_FIELDS: &[&str] = &["id", "_id", "record_id", "siret", "siren"];
const NAME_FIELDS: &[&str] = &["name", "nom", "raison_sociale", "nom_entreprise", "denomination", "company"];
const ADDRESS_FIELDS: &[&str] = &["address", "adresse", "adresse_complete", "street"];
const CITY_FIELDS: &[&str] = &["city", "ville", "commune"];
const PHONE_FIELDS: &[&str] = &["phone", "telephone", "téléphone", "tel", "mobile"];
const EMAIL_FIELDS: &[&str] = &["email", "mail", "courriel", "e_mail"];
const SECTOR_FIELDS: &[&str] = &["sector", "secteur", "activite", "activité", "naf", "libelle_naf"];
const NOTES_FIELDS: &[&str] = &["notes", "commentaires", "comments", "remarques", "description"];
const CREATED_FIELDS: &[&str] = &["createdAt", "created_at", "date_creation", "dateCreation", "creation_date"];
const ALTERNATE_FIELDS: &[&str] = &["alternate", "legacy", "source_secondaire", "ancienne_fiche"];

/// Canonical business record. Every backend shape is mapped onto this one at
/// the boundary; nothing downstream reads raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<Masked<String>>,
    pub email: Option<Masked<String>>,
    pub sector: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub alternate: Option<AlternateSource>,
}

/// Secondary data attached to a record (an older file on the same business).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AlternateSource {
    #[serde(default)]
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Build a minimal record. Mostly useful for tests and fixtures.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            city: None,
            phone: None,
            email: None,
            sector: None,
            notes: String::new(),
            created_at: None,
            alternate: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_alternate(mut self, alternate: AlternateSource) -> Self {
        self.alternate = Some(alternate);
        self
    }

    /// Normalize a loosely typed backend payload.
    ///
    /// `id` and `name` are required; every other field is optional and may
    /// arrive under any of its known aliases.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CoreError::ValidationError("record must be a JSON object".to_string()))?;

        let id = text_field(obj, ID_FIELDS)
            .ok_or_else(|| CoreError::ValidationError("record is missing required field `id`".to_string()))?;
        let name = text_field(obj, NAME_FIELDS)
            .ok_or_else(|| CoreError::ValidationError(format!("record {} is missing required field `name`", id)))?;

        let alternate = ALTERNATE_FIELDS
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_object))
            .map(|alt| AlternateSource {
                notes: text_field(alt, NOTES_FIELDS).unwrap_or_default(),
                created_at: date_field(alt, CREATED_FIELDS),
            });

        Ok(Self {
            id,
            name,
            address: text_field(obj, ADDRESS_FIELDS),
            city: text_field(obj, CITY_FIELDS),
            phone: text_field(obj, PHONE_FIELDS).map(Masked),
            email: text_field(obj, EMAIL_FIELDS).map(Masked),
            sector: text_field(obj, SECTOR_FIELDS),
            notes: text_field(obj, NOTES_FIELDS).unwrap_or_default(),
            created_at: date_field(obj, CREATED_FIELDS),
            alternate,
        })
    }
}

fn text_field(obj: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn date_field(obj: &Map<String, Value>, aliases: &[&str]) -> Option<DateTime<Utc>> {
    aliases.iter().find_map(|key| obj.get(*key).and_then(parse_date))
}

/// Accepts RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `DD/MM/YYYY`, a bare
/// year, or epoch milliseconds.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => {
            let n = n.as_i64()?;
            if (1900..=2100).contains(&n) {
                year_start(n as i32)
            } else {
                DateTime::from_timestamp_millis(n)
            }
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
        }
    }
    if s.len() == 4 {
        return s.parse::<i32>().ok().and_then(year_start);
    }
    None
}

fn year_start(year: i32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_normalizes_french_backend_fields() {
        let raw = json!({
            "siret": 12345678900012u64,
            "raison_sociale": "Boulangerie Dupont",
            "ville": "Lyon",
            "telephone": "04 78 00 00 00",
            "commentaires": "client fidèle depuis 2021",
            "date_creation": "2021-06-15"
        });

        let record = Record::from_value(&raw).unwrap();
        assert_eq!(record.id, "12345678900012");
        assert_eq!(record.name, "Boulangerie Dupont");
        assert_eq!(record.city.as_deref(), Some("Lyon"));
        assert_eq!(record.phone.as_ref().map(|p| p.expose().as_str()), Some("04 78 00 00 00"));
        assert_eq!(record.notes, "client fidèle depuis 2021");
        assert_eq!(record.created_at.unwrap().year(), 2021);
        assert!(record.alternate.is_none());
    }

    #[test]
    fn test_normalizes_english_backend_fields() {
        let raw = json!({
            "id": "rec_9",
            "name": "Acme Print",
            "city": "Paris",
            "email": "hello@acme.test",
            "notes": "new prospect",
            "createdAt": "2024-02-01T10:00:00Z"
        });

        let record = Record::from_value(&raw).unwrap();
        assert_eq!(record.id, "rec_9");
        assert_eq!(record.email.as_ref().map(|e| e.expose().as_str()), Some("hello@acme.test"));
        assert_eq!(record.created_at.unwrap().month(), 2);
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = Record::from_value(&json!({ "id": "1" })).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(msg) if msg.contains("name")));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(Record::from_value(&json!(["id", "name"])).is_err());
    }

    #[test]
    fn test_alternate_source_is_normalized() {
        let raw = json!({
            "id": "7",
            "nom": "Garage Martin",
            "legacy": { "remarques": "renouvellement annuel", "created_at": 2019 }
        });

        let record = Record::from_value(&raw).unwrap();
        let alt = record.alternate.unwrap();
        assert_eq!(alt.notes, "renouvellement annuel");
        assert_eq!(alt.created_at.unwrap().year(), 2019);
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_date(&json!("15/06/2020")).unwrap().year(), 2020);
        assert_eq!(parse_date(&json!("2018")).unwrap().year(), 2018);
        assert_eq!(parse_date(&json!("2022-01-03 08:30:00")).unwrap().day(), 3);
        assert!(parse_date(&json!("not a date")).is_none());
        assert!(parse_date(&json!(null)).is_none());
    }

    #[test]
    fn test_debug_masks_contact_fields() {
        let raw = json!({ "id": "1", "name": "X", "email": "secret@x.test" });
        let record = Record::from_value(&raw).unwrap();
        assert!(!format!("{:?}", record).contains("secret@x.test"));
    }
}
