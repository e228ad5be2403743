// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for prescription access.
//!
//! A resource owned by someone else is reported exactly like a resource that
//! does not exist. Callers can never tell the two apart, which keeps other
//! patients' ids from being enumerated.

use super::{PatientId, StorageError, StorageResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owning patient's id.
    fn owner_id(&self) -> PatientId;

    /// Short label used in not-found messages.
    fn resource_name() -> &'static str;

    /// Resource identifier used in not-found messages.
    fn resource_id(&self) -> String;
}

/// Turns a lookup result into "the caller's resource or not found".
pub trait OwnershipCheck<T> {
    fn owned_by(self, owner_id: PatientId) -> StorageResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn owned_by(self, owner_id: PatientId) -> StorageResult<T> {
        match self {
            Some(resource) if resource.owner_id() == owner_id => Ok(resource),
            Some(resource) => {
                tracing::debug!(
                    resource = T::resource_name(),
                    id = %resource.resource_id(),
                    caller = owner_id,
                    "Ownership mismatch reported as not found"
                );
                Err(not_found::<T>(&resource.resource_id()))
            }
            None => Err(StorageError::NotFound(T::resource_name().to_string())),
        }
    }
}

fn not_found<T: OwnedResource>(id: &str) -> StorageError {
    StorageError::NotFound(format!("{} {id}", T::resource_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestResource {
        id: u64,
        owner: PatientId,
    }

    impl OwnedResource for TestResource {
        fn owner_id(&self) -> PatientId {
            self.owner
        }

        fn resource_name() -> &'static str {
            "Test resource"
        }

        fn resource_id(&self) -> String {
            self.id.to_string()
        }
    }

    #[test]
    fn owner_gets_the_resource() {
        let resource = Some(TestResource { id: 1, owner: 7 });
        let resource = resource.owned_by(7).unwrap();
        assert_eq!(resource.id, 1);
    }

    #[test]
    fn non_owner_gets_not_found() {
        let resource = Some(TestResource { id: 1, owner: 7 });
        let result = resource.owned_by(8);
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn missing_and_foreign_are_the_same_error_kind() {
        let missing: Option<TestResource> = None;
        let foreign = Some(TestResource { id: 1, owner: 7 });

        assert!(matches!(missing.owned_by(8), Err(StorageError::NotFound(_))));
        assert!(matches!(foreign.owned_by(8), Err(StorageError::NotFound(_))));
    }
}
