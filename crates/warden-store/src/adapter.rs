//! Casbin adapter persisting policy rows in MongoDB.
//!
//! # Purpose
//! Lets a Casbin enforcer load and save its `p`/`g` rules from a single
//! collection of [`CasbinRule`] documents.
//!
//! # Key invariants
//! - `save_policy` replaces the whole collection with the model's rules.
//! - Rows whose `ptype` is not defined by the model are ignored on load.
//! - Every driver call goes through [`crate::repo`] and inherits its timeout.
use crate::client::MongoStore;
use crate::errors::StoreError;
use crate::repo;
use crate::rule::CasbinRule;
use async_trait::async_trait;
use casbin::error::AdapterError;
use casbin::{Adapter, Filter, Model, Result};
use mongodb::Collection;
use mongodb::bson::Document;

/// Casbin adapter over one rule collection.
pub struct MongoAdapter {
    collection: Collection<CasbinRule>,
    is_filtered: bool,
}

impl MongoAdapter {
    /// Adapter over the store's configured rule collection.
    pub fn new(store: &MongoStore) -> Self {
        Self::with_collection(store.rules())
    }

    pub fn with_collection(collection: Collection<CasbinRule>) -> Self {
        Self {
            collection,
            is_filtered: false,
        }
    }

    async fn load_rules(&self) -> Result<Vec<CasbinRule>> {
        repo::find(&self.collection, Document::new(), None)
            .await
            .map_err(adapter_error)
    }
}

fn adapter_error(err: StoreError) -> casbin::Error {
    AdapterError(Box::new(err)).into()
}

/// Insert `rule` into the model. Returns false when the model has no such
/// section/ptype.
fn load_rule_into(m: &mut dyn Model, rule: &CasbinRule) -> bool {
    let Some(sec) = rule.section() else {
        return false;
    };
    let defined = m
        .get_model()
        .get(sec)
        .is_some_and(|assertions| assertions.contains_key(&rule.ptype));
    if !defined {
        return false;
    }
    m.add_policy(sec, &rule.ptype, rule.values());
    true
}

/// Collect every rule of the model's `p` and `g` sections as rows.
pub(crate) fn model_rules(m: &dyn Model) -> Vec<CasbinRule> {
    let mut rows = Vec::new();
    for sec in ["p", "g"] {
        let Some(assertions) = m.get_model().get(sec) else {
            continue;
        };
        let mut ptypes: Vec<&String> = assertions.keys().collect();
        ptypes.sort();
        for ptype in ptypes {
            for values in m.get_policy(sec, ptype) {
                match CasbinRule::from_line(ptype, &values) {
                    Some(row) => rows.push(row),
                    None => tracing::warn!(%ptype, ?values, "skipping policy with unsupported arity"),
                }
            }
        }
    }
    rows
}

#[async_trait]
impl Adapter for MongoAdapter {
    async fn load_policy(&mut self, m: &mut dyn Model) -> Result<()> {
        let rules = self.load_rules().await?;
        let mut skipped = 0usize;
        for rule in &rules {
            if !load_rule_into(m, rule) {
                skipped += 1;
            }
        }
        self.is_filtered = false;
        tracing::debug!(loaded = rules.len() - skipped, skipped, "loaded policy rows");
        Ok(())
    }

    async fn load_filtered_policy<'a>(&mut self, m: &mut dyn Model, f: Filter<'a>) -> Result<()> {
        let rules = self.load_rules().await?;
        for rule in &rules {
            let passes = match rule.section() {
                Some("p") => rule.matches_filter(&f.p),
                Some("g") => rule.matches_filter(&f.g),
                _ => false,
            };
            if passes {
                load_rule_into(m, rule);
            }
        }
        self.is_filtered = true;
        Ok(())
    }

    async fn save_policy(&mut self, m: &mut dyn Model) -> Result<()> {
        let rows = model_rules(m);
        repo::delete_many(&self.collection, Document::new(), None)
            .await
            .map_err(adapter_error)?;
        repo::insert_many(&self.collection, &rows, None)
            .await
            .map_err(adapter_error)?;
        tracing::debug!(rows = rows.len(), "saved policy rows");
        Ok(())
    }

    async fn clear_policy(&mut self) -> Result<()> {
        repo::delete_many(&self.collection, Document::new(), None)
            .await
            .map_err(adapter_error)?;
        Ok(())
    }

    fn is_filtered(&self) -> bool {
        self.is_filtered
    }

    async fn add_policy(&mut self, _sec: &str, ptype: &str, rule: Vec<String>) -> Result<bool> {
        let Some(row) = CasbinRule::from_line(ptype, &rule) else {
            return Ok(false);
        };
        repo::insert_one(&self.collection, &row, None)
            .await
            .map_err(adapter_error)?;
        Ok(true)
    }

    async fn add_policies(
        &mut self,
        _sec: &str,
        ptype: &str,
        rules: Vec<Vec<String>>,
    ) -> Result<bool> {
        let rows: Option<Vec<CasbinRule>> = rules
            .iter()
            .map(|rule| CasbinRule::from_line(ptype, rule))
            .collect();
        let Some(rows) = rows else {
            return Ok(false);
        };
        repo::insert_many(&self.collection, &rows, None)
            .await
            .map_err(adapter_error)?;
        Ok(true)
    }

    async fn remove_policy(&mut self, _sec: &str, ptype: &str, rule: Vec<String>) -> Result<bool> {
        let result = repo::delete_one(
            &self.collection,
            CasbinRule::exact_filter(ptype, &rule),
            None,
        )
        .await
        .map_err(adapter_error)?;
        Ok(result.deleted_count > 0)
    }

    async fn remove_policies(
        &mut self,
        _sec: &str,
        ptype: &str,
        rules: Vec<Vec<String>>,
    ) -> Result<bool> {
        let mut removed = false;
        for rule in rules {
            let result = repo::delete_one(
                &self.collection,
                CasbinRule::exact_filter(ptype, &rule),
                None,
            )
            .await
            .map_err(adapter_error)?;
            removed |= result.deleted_count > 0;
        }
        Ok(removed)
    }

    async fn remove_filtered_policy(
        &mut self,
        _sec: &str,
        ptype: &str,
        field_index: usize,
        field_values: Vec<String>,
    ) -> Result<bool> {
        let Some(filter) = CasbinRule::field_filter(ptype, field_index, &field_values) else {
            tracing::warn!(
                %ptype,
                field_index,
                values = field_values.len(),
                "filtered removal reaches past the last column, nothing removed"
            );
            return Ok(false);
        };
        let result = repo::delete_many(&self.collection, filter, None)
            .await
            .map_err(adapter_error)?;
        Ok(result.deleted_count > 0)
    }
}
