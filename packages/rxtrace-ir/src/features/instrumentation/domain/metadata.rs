//! Metadata records
//!
//! One record per construct kind. Records serialize to camelCase JSON and are
//! embedded verbatim as the object-literal argument of the wrapper call, so
//! the field names here are the wire format the runtime wrappers read.

use serde::Serialize;

use super::construct::{ConstructKind, OperatorPosition};
use crate::shared::models::SourcePosition;
use crate::shared::utils::Identity;

/// Fields every record carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataHeader {
    pub uuid: Identity,
    pub file: String,
    pub line: u32,
    pub position: usize,
}

impl MetadataHeader {
    pub fn new(uuid: Identity, position: &SourcePosition) -> Self {
        Self {
            uuid,
            file: position.file.clone(),
            line: position.line,
            position: position.start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationOperatorMetadata {
    #[serde(flatten)]
    pub header: MetadataHeader,
    #[serde(rename = "type")]
    pub operator: String,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_declaration: Option<Identity>,
}

/// A stream feeding a join
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseObservable {
    pub uuid: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinCreationOperatorMetadata {
    #[serde(flatten)]
    pub header: MetadataHeader,
    #[serde(rename = "type")]
    pub operator: String,
    pub identifier: String,
    pub observables: Vec<BaseObservable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_declaration: Option<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservableSubjectConstructorMetadata {
    #[serde(flatten)]
    pub header: MetadataHeader,
    #[serde(rename = "type")]
    pub constructor: String,
    pub identifier: String,
    pub type_arguments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_declaration: Option<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipeMetadata {
    #[serde(flatten)]
    pub header: MetadataHeader,
    pub observable: Identity,
    pub identifier: String,
    /// Pipes the source already flows through, nearest first
    pub pipes: Vec<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipeableOperatorMetadata {
    #[serde(flatten)]
    pub header: MetadataHeader,
    #[serde(rename = "type")]
    pub operator: String,
    pub function: String,
    pub observable: Identity,
    pub pipe: Identity,
    pub pipes: Vec<Identity>,
    pub operator_position: OperatorPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeMetadata {
    #[serde(flatten)]
    pub header: MetadataHeader,
    pub observable: Identity,
    /// Pipes between the subscription and its observable, nearest first
    pub pipes: Vec<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDeclarationMetadata {
    #[serde(flatten)]
    pub header: MetadataHeader,
    pub identifier: String,
    pub kind: String,
    pub type_arguments: Vec<String>,
}

/// Metadata of any construct kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConstructMetadata {
    CreationOperator(CreationOperatorMetadata),
    JoinCreationOperator(JoinCreationOperatorMetadata),
    ObjectOrSubjectConstructor(ObservableSubjectConstructorMetadata),
    Pipe(PipeMetadata),
    PipeableOperator(PipeableOperatorMetadata),
    Subscribe(SubscribeMetadata),
    PropertyDeclaration(PropertyDeclarationMetadata),
}

impl ConstructMetadata {
    pub fn header(&self) -> &MetadataHeader {
        match self {
            ConstructMetadata::CreationOperator(m) => &m.header,
            ConstructMetadata::JoinCreationOperator(m) => &m.header,
            ConstructMetadata::ObjectOrSubjectConstructor(m) => &m.header,
            ConstructMetadata::Pipe(m) => &m.header,
            ConstructMetadata::PipeableOperator(m) => &m.header,
            ConstructMetadata::Subscribe(m) => &m.header,
            ConstructMetadata::PropertyDeclaration(m) => &m.header,
        }
    }

    pub fn uuid(&self) -> &Identity {
        &self.header().uuid
    }

    pub fn kind(&self) -> ConstructKind {
        match self {
            ConstructMetadata::CreationOperator(_) => ConstructKind::CreationOperator,
            ConstructMetadata::JoinCreationOperator(_) => ConstructKind::JoinCreationOperator,
            ConstructMetadata::ObjectOrSubjectConstructor(_) => {
                ConstructKind::ObjectOrSubjectConstructor
            }
            ConstructMetadata::Pipe(_) => ConstructKind::Pipe,
            ConstructMetadata::PipeableOperator(_) => ConstructKind::PipeableOperator,
            ConstructMetadata::Subscribe(_) => ConstructKind::Subscribe,
            ConstructMetadata::PropertyDeclaration(_) => ConstructKind::PropertyDeclaration,
        }
    }

    /// Bound variable name, where the record has one
    pub fn identifier(&self) -> Option<&str> {
        match self {
            ConstructMetadata::CreationOperator(m) => Some(&m.identifier),
            ConstructMetadata::JoinCreationOperator(m) => Some(&m.identifier),
            ConstructMetadata::ObjectOrSubjectConstructor(m) => Some(&m.identifier),
            ConstructMetadata::Pipe(m) => Some(&m.identifier),
            ConstructMetadata::PropertyDeclaration(m) => Some(&m.identifier),
            ConstructMetadata::PipeableOperator(_) | ConstructMetadata::Subscribe(_) => None,
        }
    }

    /// Object-literal source text embedded in the rewritten call
    pub fn to_literal(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
