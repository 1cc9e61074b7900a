//! # Shipment Model
//!
//! Domain types for a shipment as shown to the user, and the serde types
//! describing the part of the tracking API response the bot relies on.
//!
//! The API schema is owned by the logistics provider. Only four things are
//! read from it: the order record (which may be `null`), its waybill number,
//! its quantity, and the list of timestamped status messages.

use serde::{Deserialize, Deserializer};

/// One timestamped entry in a shipment's history feed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusEvent {
    #[serde(rename = "dateTime", deserialize_with = "string_or_number")]
    pub time: String,
    #[serde(rename = "elsAddress", default, deserialize_with = "nullable_string")]
    pub message: String,
}

impl StatusEvent {
    pub fn new(time: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            message: message.into(),
        }
    }
}

/// A shipment found by the tracking API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentRecord {
    pub waybill_number: String,
    pub quantity: String,
    /// Events in the order the API returned them
    pub events: Vec<StatusEvent>,
}

/// Top level of the tracking API response
#[derive(Debug, Deserialize)]
pub struct LookupEnvelope {
    pub data: LookupBody,
}

#[derive(Debug, Deserialize)]
pub struct LookupBody {
    pub data: LookupPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupPayload {
    #[serde(default)]
    pub wl_order: Option<WaybillOrder>,
    #[serde(default)]
    pub wl_message_list: Option<Vec<StatusEvent>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaybillOrder {
    #[serde(deserialize_with = "string_or_number")]
    pub waybill_number: String,
    #[serde(deserialize_with = "string_or_number")]
    pub quantity: String,
}

impl LookupEnvelope {
    /// `None` when the API knows no shipment for the code
    pub fn into_record(self) -> Option<ShipmentRecord> {
        let payload = self.data.data;
        payload.wl_order.map(|order| ShipmentRecord {
            waybill_number: order.waybill_number,
            quantity: order.quantity,
            events: payload.wl_message_list.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => text,
        Scalar::Number(number) => number.to_string(),
    })
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
