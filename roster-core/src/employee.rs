//! Employee entity and its insert/patch payloads.
//!
//! The JSON field names match the wire format produced by the existing
//! service (`ID`, `CreatedAt`, `FirstName`, ...), which is also the format
//! stored in the cache snapshot.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::schema::COLUMN_COUNT;
use crate::{EmployeeId, Timestamp};

/// A persisted employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Employee {
    #[serde(rename = "ID")]
    pub id: EmployeeId,
    #[serde(rename = "CreatedAt")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[serde(rename = "UpdatedAt")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
    /// Soft-delete marker. Records with a value here are invisible to reads.
    #[serde(rename = "DeletedAt")]
    #[cfg_attr(
        feature = "openapi",
        schema(value_type = Option<String>, format = "date-time")
    )]
    pub deleted_at: Option<Timestamp>,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Postal")]
    pub postal: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Web")]
    pub web: String,
}

impl Employee {
    /// Materialize a stored record from an insert payload.
    pub fn from_new(id: EmployeeId, new: NewEmployee, now: Timestamp) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            first_name: new.first_name,
            last_name: new.last_name,
            company: new.company,
            address: new.address,
            city: new.city,
            country: new.country,
            postal: new.postal,
            phone: new.phone,
            email: new.email,
            web: new.web,
        }
    }

    /// Whether the record has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The ten data fields in ingestion column order.
    pub fn fields(&self) -> [&str; COLUMN_COUNT] {
        [
            &self.first_name,
            &self.last_name,
            &self.company,
            &self.address,
            &self.city,
            &self.country,
            &self.postal,
            &self.phone,
            &self.email,
            &self.web,
        ]
    }
}

/// Insert payload: the ten data columns of one ingested row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub postal: String,
    pub phone: String,
    pub email: String,
    pub web: String,
}

impl NewEmployee {
    /// Build an insert payload from one spreadsheet row.
    ///
    /// `row` is the 1-based sheet row number, used only for error reporting.
    pub fn from_row(row: usize, cells: &[String]) -> Result<Self, ValidationError> {
        let [first_name, last_name, company, address, city, country, postal, phone, email, web] =
            <&[String; COLUMN_COUNT]>::try_from(cells).map_err(|_| {
                ValidationError::ColumnCount {
                    row,
                    expected: COLUMN_COUNT,
                    found: cells.len(),
                }
            })?;

        Ok(Self {
            first_name: first_name.clone(),
            last_name: last_name.clone(),
            company: company.clone(),
            address: address.clone(),
            city: city.clone(),
            country: country.clone(),
            postal: postal.clone(),
            phone: phone.clone(),
            email: email.clone(),
            web: web.clone(),
        })
    }
}

/// Partial update body for `PUT /employee/{id}`.
///
/// Absent, null and empty-string fields leave the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default, rename_all = "PascalCase")]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
}

impl EmployeePatch {
    /// True when no field would overwrite anything.
    pub fn is_empty(&self) -> bool {
        self.pairs().iter().all(|(value, _)| provided(value).is_none())
    }

    /// Merge provided fields into `employee`. Returns the number of fields
    /// that were overwritten.
    pub fn apply_to(&self, employee: &mut Employee) -> usize {
        let targets: [&mut String; COLUMN_COUNT] = [
            &mut employee.first_name,
            &mut employee.last_name,
            &mut employee.company,
            &mut employee.address,
            &mut employee.city,
            &mut employee.country,
            &mut employee.postal,
            &mut employee.phone,
            &mut employee.email,
            &mut employee.web,
        ];

        let mut applied = 0;
        for ((value, _), target) in self.pairs().into_iter().zip(targets) {
            if let Some(value) = provided(value) {
                target.clear();
                target.push_str(value);
                applied += 1;
            }
        }
        applied
    }

    fn pairs(&self) -> [(&Option<String>, &'static str); COLUMN_COUNT] {
        [
            (&self.first_name, "FirstName"),
            (&self.last_name, "LastName"),
            (&self.company, "Company"),
            (&self.address, "Address"),
            (&self.city, "City"),
            (&self.country, "Country"),
            (&self.postal, "Postal"),
            (&self.phone, "Phone"),
            (&self.email, "Email"),
            (&self.web, "Web"),
        ]
    }

    /// Names of the fields this patch would overwrite, for logging.
    pub fn provided_fields(&self) -> Vec<&'static str> {
        self.pairs()
            .into_iter()
            .filter(|(value, _)| provided(value).is_some())
            .map(|(_, name)| name)
            .collect()
    }
}

fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
