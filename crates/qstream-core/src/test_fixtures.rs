//! Shared entities for unit tests.
#![allow(dead_code)]

use crate::{
    query::QueryStream,
    resolve::{DescriptorCache, Resolver},
    traits::EntityKind,
};
use qstream_derive::Entity;
use std::sync::Arc;
use time::{Date, PrimitiveDateTime};

///
/// Person
///

#[derive(Clone, Debug, Entity)]
pub(crate) struct Person {
    pub(crate) person_id: u64,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) personal_no: String,
    pub(crate) birth_date: Date,
    pub(crate) addresses: Vec<Address>,
    #[entity(skip)]
    pub(crate) scratch: u8,
}

impl Person {
    /// Computed getter with no backing field.
    pub(crate) fn get_full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Getter-style alias of `last_name`.
    pub(crate) fn get_last_name(&self) -> &str {
        &self.last_name
    }
}

///
/// Address
///

#[derive(Clone, Debug, Entity)]
pub(crate) struct Address {
    pub(crate) address_id: u64,
    pub(crate) person_id: u64,
    pub(crate) city: String,
    #[entity(column = "street_line")]
    pub(crate) street: String,
}

///
/// Order
///

#[derive(Clone, Debug, Entity)]
#[entity(name = "Order", table = "orders")]
pub(crate) struct Order {
    pub(crate) order_id: u64,
    pub(crate) person_id: u64,
    pub(crate) total: i64,
    pub(crate) placed_at: PrimitiveDateTime,
}

/// Stream over `E` backed by a fresh, private descriptor cache.
pub(crate) fn isolated<E: EntityKind>() -> QueryStream<E> {
    QueryStream::with_resolver(Resolver::new(Arc::new(DescriptorCache::new())))
}
