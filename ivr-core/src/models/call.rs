use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Spreadsheet column headers, in the order they are written.
pub const COLUMNS: [&str; 10] = [
    "Call_ID",
    "Customer_Name",
    "Phone_Number",
    "Policy_Number",
    "Question_Asked",
    "Customer_Response",
    "Response_Type",
    "Call_Status",
    "Confidence_Score",
    "Agent_Action_Required",
];

/// One row of IVR call metadata. Used as the full body for POST and PUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    #[serde(rename = "Call_ID")]
    pub call_id: i64,
    #[serde(rename = "Customer_Name")]
    pub customer_name: String,
    #[serde(rename = "Phone_Number")]
    pub phone_number: String,
    #[serde(rename = "Policy_Number")]
    pub policy_number: String,
    #[serde(rename = "Question_Asked")]
    pub question_asked: String,
    #[serde(rename = "Customer_Response")]
    pub customer_response: String,
    #[serde(rename = "Response_Type")]
    pub response_type: String,
    #[serde(rename = "Call_Status")]
    pub call_status: String,
    #[serde(rename = "Confidence_Score")]
    pub confidence_score: f64,
    #[serde(rename = "Agent_Action_Required")]
    pub agent_action_required: String,
}

/// Longest text a spreadsheet cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

impl CallRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_confidence(self.confidence_score)?;
        check_text("Customer_Name", &self.customer_name)?;
        check_text("Phone_Number", &self.phone_number)?;
        check_text("Policy_Number", &self.policy_number)?;
        check_text("Question_Asked", &self.question_asked)?;
        check_text("Customer_Response", &self.customer_response)?;
        check_text("Response_Type", &self.response_type)?;
        check_text("Call_Status", &self.call_status)?;
        check_text("Agent_Action_Required", &self.agent_action_required)
    }
}

/// Partial body for PATCH. A field that is absent (or null) is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallUpdate {
    #[serde(rename = "Customer_Response", default, skip_serializing_if = "Option::is_none")]
    pub customer_response: Option<String>,
    #[serde(rename = "Call_Status", default, skip_serializing_if = "Option::is_none")]
    pub call_status: Option<String>,
    #[serde(rename = "Confidence_Score", default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(
        rename = "Agent_Action_Required",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub agent_action_required: Option<String>,
}

impl CallUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(score) = self.confidence_score {
            check_confidence(score)?;
        }
        let texts = [
            ("Customer_Response", &self.customer_response),
            ("Call_Status", &self.call_status),
            ("Agent_Action_Required", &self.agent_action_required),
        ];
        for (field, value) in texts {
            if let Some(v) = value {
                check_text(field, v)?;
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.customer_response.is_none()
            && self.call_status.is_none()
            && self.confidence_score.is_none()
            && self.agent_action_required.is_none()
    }

    /// Copy every supplied field onto `record`.
    pub fn apply(self, record: &mut CallRecord) {
        if let Some(v) = self.customer_response {
            record.customer_response = v;
        }
        if let Some(v) = self.call_status {
            record.call_status = v;
        }
        if let Some(v) = self.confidence_score {
            record.confidence_score = v;
        }
        if let Some(v) = self.agent_action_required {
            record.agent_action_required = v;
        }
    }
}

fn check_confidence(value: f64) -> Result<(), ValidationError> {
    // NaN fails both comparisons, so it is rejected here as well
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "Confidence_Score",
            value,
        })
    }
}

fn check_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > MAX_CELL_CHARS {
        return Err(ValidationError::TooLong {
            field,
            len,
            max: MAX_CELL_CHARS,
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample(call_id: i64) -> CallRecord {
    CallRecord {
        call_id,
        customer_name: "A".to_string(),
        phone_number: "555".to_string(),
        policy_number: "P1".to_string(),
        question_asked: "Q".to_string(),
        customer_response: "R".to_string(),
        response_type: "T".to_string(),
        call_status: "open".to_string(),
        confidence_score: 0.9,
        agent_action_required: "none".to_string(),
    }
}
