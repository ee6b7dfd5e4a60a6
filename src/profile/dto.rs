use serde::{Deserialize, Serialize};
use super::repo_types::{BodyRecord, Goal};
use crate::auth::repo_types::{BodyAttrs, Customer, Gender};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    pub email: Option<String>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub target_weight: Option<f64>,
    pub target_calories: Option<i32>,
}

impl ProfileView {
    pub fn new(customer: Customer, goal: Option<&Goal>) -> Self {
        Self {
            gender: customer.gender(),
            id: customer.login_id,
            email: customer.email,
            weight: customer.weight,
            age: customer.age,
            height: customer.height,
            target_weight: goal.map(|g| g.target_weight),
            target_calories: goal.map(|g| g.target_calories),
        }
    }
}

/// `PUT /api/profile`; missing body fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub new_password: Option<String>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub target_weight: Option<f64>,
    pub target_calories: Option<i32>,
}

impl UpdateProfileRequest {
    pub fn attrs(&self) -> BodyAttrs {
        BodyAttrs {
            weight: self.weight,
            age: self.age,
            gender: self.gender,
            height: self.height,
        }
    }
}

/// `POST /body`, the first-run goal setup.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySetupRequest {
    pub target_weight: Option<f64>,
    pub target_calories: Option<i32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub inbody: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    pub target_weight: f64,
    pub target_calories: i32,
    pub record_date: String,
}

impl From<Goal> for GoalView {
    fn from(g: Goal) -> Self {
        Self {
            target_weight: g.target_weight,
            target_calories: g.target_calories,
            record_date: g.record_date.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyRecordView {
    pub target_weight: Option<f64>,
    pub target_calories: Option<i32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub inbody: Option<f64>,
    pub record_date: String,
}

impl From<BodyRecord> for BodyRecordView {
    fn from(b: BodyRecord) -> Self {
        Self {
            target_weight: b.target_weight,
            target_calories: b.target_calories,
            weight: b.weight,
            height: b.height,
            age: b.age,
            gender: b.gender,
            inbody: b.inbody,
            record_date: b.record_date.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: String,
    pub email: Option<String>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
}

impl From<Customer> for AccountView {
    fn from(c: Customer) -> Self {
        Self {
            gender: c.gender(),
            id: c.login_id,
            email: c.email,
            weight: c.weight,
            age: c.age,
            height: c.height,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};
    use uuid::Uuid;

    #[test]
    fn profile_view_takes_targets_from_goal() {
        let customer = Customer {
            id: Uuid::new_v4(),
            login_id: "runner".into(),
            email: Some("r@example.com".into()),
            password_hash: "h".into(),
            weight: Some(70.0),
            age: Some(31),
            gender: Some("F".into()),
            height: Some(165.0),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let goal = Goal {
            id: 1,
            customer_id: customer.id,
            target_weight: 62.5,
            target_calories: 1800,
            record_date: date!(2024 - 05 - 01),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let v = serde_json::to_value(ProfileView::new(customer, Some(&goal))).unwrap();
        assert_eq!(v["id"], "runner");
        assert_eq!(v["gender"], "F");
        assert_eq!(v["targetWeight"], 62.5);
        assert_eq!(v["targetCalories"], 1800);
    }

    #[test]
    fn update_request_accepts_partial_bodies() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"weight":68.2,"targetWeight":60,"targetCalories":1700}"#).unwrap();
        assert_eq!(req.attrs().weight, Some(68.2));
        assert_eq!(req.attrs().age, None);
        assert!(req.new_password.is_none());
    }
}
