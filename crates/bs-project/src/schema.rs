//! Definition document schema.
//!
//! A definition is a map of global parameters plus a `components` list.
//! Every component entry carries its `type`, an optional `name` and any of
//! its parameters. Values are kept untyped here; they are checked when
//! applied to a project.

use std::collections::BTreeMap;

use bs_model::ParamValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDef {
    #[serde(flatten)]
    pub parameters: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub parameters: BTreeMap<String, ParamValue>,
}
