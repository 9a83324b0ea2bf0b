// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-process tables backing every repository.
//!
//! A [`Table`] holds rows keyed by a sequence-generated id. Writes take the
//! table's write lock for their whole duration, so a uniqueness check and the
//! insert or update it guards happen atomically. Updates are applied to a copy
//! of the row and only committed when the closure succeeds; a failed update
//! leaves the stored row untouched.

use crate::{PlatformError, PlatformResult};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

struct Rows<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

pub struct Table<T> {
    name: &'static str,
    inner: RwLock<Rows<T>>,
}

/// Conflict check that accepts every pair of rows.
pub fn no_conflicts<T>(_candidate: &T, _existing: &T) -> PlatformResult<()> {
    Ok(())
}

impl<T: Clone> Table<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: RwLock::new(Rows {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn not_found(&self, id: u64) -> PlatformError {
        PlatformError::NotFound(format!("{} {} not found", self.name, id))
    }

    /// Build a row for the next id and insert it, unless `conflicts` rejects it
    /// against any existing row.
    pub async fn insert<B, C>(&self, build: B, conflicts: C) -> PlatformResult<T>
    where
        B: FnOnce(u64) -> T,
        C: Fn(&T, &T) -> PlatformResult<()>,
    {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        let candidate = build(id);
        for existing in inner.rows.values() {
            conflicts(&candidate, existing)?;
        }
        inner.next_id += 1;
        inner.rows.insert(id, candidate.clone());
        Ok(candidate)
    }

    pub async fn get(&self, id: u64) -> PlatformResult<T> {
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn find<P>(&self, predicate: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.inner
            .read()
            .await
            .rows
            .values()
            .find(|row| predicate(row))
            .cloned()
    }

    /// Rows matching `predicate`, in id order.
    pub async fn select<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.inner
            .read()
            .await
            .rows
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    pub async fn count<P>(&self, predicate: P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        self.inner
            .read()
            .await
            .rows
            .values()
            .filter(|row| predicate(row))
            .count()
    }

    /// Apply `apply` to a copy of row `id`, check the result against every
    /// other row with `conflicts`, then commit.
    pub async fn update<F, C>(&self, id: u64, apply: F, conflicts: C) -> PlatformResult<T>
    where
        F: FnOnce(&mut T) -> PlatformResult<()>,
        C: Fn(&T, &T) -> PlatformResult<()>,
    {
        let mut inner = self.inner.write().await;
        let mut candidate = inner.rows.get(&id).cloned().ok_or_else(|| self.not_found(id))?;
        apply(&mut candidate)?;
        for (other_id, existing) in inner.rows.iter() {
            if *other_id != id {
                conflicts(&candidate, existing)?;
            }
        }
        inner.rows.insert(id, candidate.clone());
        Ok(candidate)
    }

    pub async fn modify<F>(&self, id: u64, apply: F) -> PlatformResult<T>
    where
        F: FnOnce(&mut T) -> PlatformResult<()>,
    {
        self.update(id, apply, no_conflicts).await
    }

    /// Physically remove row `id`.
    pub async fn remove(&self, id: u64) -> PlatformResult<T> {
        self.inner
            .write()
            .await
            .rows
            .remove(&id)
            .ok_or_else(|| self.not_found(id))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u64,
        code: String,
        active: bool,
    }

    fn unique_code(candidate: &Row, existing: &Row) -> PlatformResult<()> {
        if candidate.code == existing.code {
            return Err(PlatformError::Conflict(format!("code {} exists", candidate.code)));
        }
        Ok(())
    }

    fn row(code: &str) -> impl FnOnce(u64) -> Row + '_ {
        move |id| Row {
            id,
            code: code.to_string(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let table = Table::new("Row");
        let a = table.insert(row("A"), unique_code).await.expect("a");
        let b = table.insert(row("B"), unique_code).await.expect("b");
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[tokio::test]
    async fn test_conflicting_insert_does_not_consume_id() {
        let table = Table::new("Row");
        table.insert(row("A"), unique_code).await.expect("a");
        let err = table.insert(row("A"), unique_code).await.unwrap_err();
        assert!(matches!(err, PlatformError::Conflict(_)));
        let b = table.insert(row("B"), unique_code).await.expect("b");
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_row_untouched() {
        let table = Table::new("Row");
        table.insert(row("A"), unique_code).await.expect("a");
        table.insert(row("B"), unique_code).await.expect("b");

        let err = table
            .update(
                2,
                |r| {
                    r.code = "A".to_string();
                    Ok(())
                },
                unique_code,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Conflict(_)));
        assert_eq!(table.get(2).await.expect("b").code, "B");

        let err = table
            .modify(2, |r| {
                r.active = false;
                Err(PlatformError::Validation("nope".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Validation(_)));
        assert!(table.get(2).await.expect("b").active);
    }

    #[tokio::test]
    async fn test_missing_row_is_not_found() {
        let table: Table<Row> = Table::new("Row");
        assert_eq!(
            table.get(9).await.unwrap_err(),
            PlatformError::NotFound("Row 9 not found".to_string())
        );
        assert!(table.remove(9).await.is_err());
    }
}
