//! The contract registry.
//!
//! A [`ContractRegistry`] knows how to build the base contract of every
//! registered record, holds the ordered list of [`ContractModifier`]s and
//! caches the finalized contracts.
//!
//! Contracts are computed lazily: the first request for a type runs
//! naming, construction selection, every modifier and finalization, then
//! stores the result. Later requests, from any thread, share it.
//!
//! With the `auto_register` feature, records submitted through
//! [`auto_register!`](crate::auto_register) can be registered at once by
//! [`ContractRegistry::auto_register`].

mod modifier;
mod options;

#[cfg(feature = "auto_register")]
mod auto_register;

pub use modifier::ContractModifier;
pub use options::{ContractOptions, NamingPolicy, UnknownKeys};

#[cfg(feature = "auto_register")]
pub use auto_register::AutoRegistration;

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use serde_core::de::DeserializeSeed;
use serde_core::{Deserializer, Serialize, Serializer};

use crate::codec::{Codec, RecordCodec, SequenceCodec, TypedCodec, ValueCodec};
use crate::contract::{Record, TypeContract};
use crate::error::{ContractError, DecodeError, EncodeError, FieldError};
use crate::info::{FieldType, Shape, TypeSpec};
use crate::serde::{DecodeContext, EncodeContext, RecordEncoder, RecordSeed};
use crate::utils::TypeIdMap;

type ContractSource = fn() -> TypeContract;

fn build_contract<T: Record>() -> TypeContract {
    T::contract().build()
}

// -----------------------------------------------------------------------------
// ContractRegistry

/// Builds, caches and serves [`TypeContract`]s.
///
/// Registration and modifier installation take `&mut self`; everything
/// else works through a shared reference and is safe to call from many
/// threads at once.
///
/// # Example
///
/// ```
/// use vc_contract::{ContractBuilder, ContractRegistry, Record, impl_field_type};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl_field_type!(record Point);
///
/// impl Record for Point {
///     fn contract() -> ContractBuilder<Self> {
///         ContractBuilder::<Self>::new()
///             .with_default()
///             .field("x", |p| &p.x, |p, v| p.x = v)
///             .field("y", |p| &p.y, |p, v| p.y = v)
///     }
/// }
///
/// let mut registry = ContractRegistry::new();
/// registry.register::<Point>();
///
/// let mut de = serde_json::Deserializer::from_str(r#"{"x":1,"y":2}"#);
/// let point: Point = registry.decode(&mut de).unwrap();
/// assert_eq!((point.x, point.y), (1, 2));
/// ```
pub struct ContractRegistry {
    options: ContractOptions,
    sources: TypeIdMap<ContractSource>,
    codecs: TypeIdMap<Arc<dyn ValueCodec>>,
    modifiers: Vec<Arc<dyn ContractModifier>>,
    cache: RwLock<TypeIdMap<Arc<TypeContract>>>,
}

impl Default for ContractRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ContractRegistry {
    pub const fn new() -> Self {
        Self::with_options(ContractOptions::new())
    }

    pub const fn with_options(options: ContractOptions) -> Self {
        Self {
            options,
            sources: TypeIdMap::new(),
            codecs: TypeIdMap::new(),
            modifiers: Vec::new(),
            cache: RwLock::new(TypeIdMap::new()),
        }
    }

    #[inline]
    pub fn options(&self) -> &ContractOptions {
        &self.options
    }

    // -------------------------------------------------------------------------
    // Configuration

    /// Registers record `T`. Registering twice is a no-op.
    pub fn register<T: Record>(&mut self) -> &mut Self {
        self.sources
            .get_or_insert(TypeId::of::<T>(), || build_contract::<T> as ContractSource);
        self
    }

    /// Returns `true` if `T` has been registered.
    #[inline]
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.sources.contains(&TypeId::of::<T>())
    }

    /// Registers every record submitted through
    /// [`auto_register!`](crate::auto_register).
    ///
    /// Returns `false` when the `auto_register` feature is disabled.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            auto_register::register_all(self);
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Uses `codec` for every value of type `C::Value`, replacing the
    /// codec derived from its [`TypeSpec`].
    pub fn register_codec<C: Codec>(&mut self, codec: C) -> &mut Self {
        let id = <C::Value as FieldType>::type_spec().id();
        self.codecs.insert(id, Arc::new(TypedCodec::new(codec)));
        self.cache.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
        self
    }

    /// Appends a modifier. Contracts computed so far are discarded.
    pub fn add_modifier(&mut self, modifier: impl ContractModifier) -> &mut Self {
        self.modifiers.push(Arc::new(modifier));
        self.cache.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
        self
    }

    #[inline]
    pub fn modifiers(&self) -> impl ExactSizeIterator<Item = &dyn ContractModifier> {
        self.modifiers.iter().map(|m| &**m)
    }

    // -------------------------------------------------------------------------
    // Contracts

    /// Returns the finalized contract of `T`.
    #[inline]
    pub fn contract<T: FieldType>(&self) -> Result<Arc<TypeContract>, ContractError> {
        self.contract_for(&T::type_spec())
    }

    /// Returns the finalized contract of the record described by `ty`.
    ///
    /// The first call computes and caches it. Concurrent first calls may
    /// compute it more than once; the first stored result wins and every
    /// caller receives that one.
    pub fn contract_for(&self, ty: &TypeSpec) -> Result<Arc<TypeContract>, ContractError> {
        let id = ty.id();
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(contract) = cache.get(&id) {
                return Ok(contract.clone());
            }
        }

        let contract = Arc::new(self.compute(ty)?);

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.get_or_insert(id, || contract).clone())
    }

    fn compute(&self, ty: &TypeSpec) -> Result<TypeContract, ContractError> {
        let Some(source) = self.sources.get(&ty.id()) else {
            return Err(ContractError::Unregistered(ty.path()));
        };

        let mut contract = source();
        contract.apply_naming(self.options.naming);
        contract.select_construction()?;

        for modifier in &self.modifiers {
            modifier.modify(&mut contract, self)?;
            log::trace!(
                "modifier `{}` rewrote `{}`",
                modifier.name(),
                contract.type_path()
            );
        }

        contract.finalize(self)?;
        log::debug!(
            "computed contract of `{}` with {} field(s)",
            contract.type_path(),
            contract.descriptors().len()
        );
        Ok(contract)
    }

    /// Resolves the codec used for values described by `ty`.
    pub fn codec_for(&self, ty: &TypeSpec) -> Result<Arc<dyn ValueCodec>, ContractError> {
        if let Some(codec) = self.codecs.get(&ty.id()) {
            return Ok(codec.clone());
        }
        match ty.shape() {
            Shape::Scalar(native) => Ok(native()),
            Shape::Record if self.sources.contains(&ty.id()) => Ok(Arc::new(RecordCodec::new(*ty))),
            Shape::Record => Err(ContractError::Unregistered(ty.path())),
            Shape::Sequence(seq) => {
                let element = self.codec_for(&seq.element())?;
                Ok(Arc::new(SequenceCodec::new(*seq, element)))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Decode / Encode

    /// Decodes a `T` from `deserializer`.
    pub fn decode<'de, T, D>(&self, deserializer: D) -> Result<T, DecodeError>
    where
        T: Record,
        D: Deserializer<'de>,
        D::Error: core::error::Error + Send + Sync + 'static,
    {
        let contract = self.contract::<T>()?;
        let ctx = DecodeContext::new(self);

        match RecordSeed::new(contract, &ctx).deserialize(deserializer) {
            Ok(value) => match value.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(_) => Err(FieldError::type_mismatch::<T>("record").into()),
            },
            Err(err) => Err(ctx
                .take_failure()
                .unwrap_or_else(|| DecodeError::Format(Box::new(err)))),
        }
    }

    /// Encodes `value` into `serializer`.
    pub fn encode<T, S>(&self, value: &T, serializer: S) -> Result<S::Ok, EncodeError>
    where
        T: Record,
        S: Serializer,
        S::Error: core::error::Error + Send + Sync + 'static,
    {
        let contract = self.contract::<T>()?;
        let ctx = EncodeContext::new(self);

        match RecordEncoder::new(contract, value, &ctx).serialize(serializer) {
            Ok(ok) => Ok(ok),
            Err(err) => Err(ctx
                .take_failure()
                .unwrap_or_else(|| EncodeError::Format(Box::new(err)))),
        }
    }
}

impl fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self
            .cache
            .read()
            .map(|cache| cache.len())
            .unwrap_or_default();
        f.debug_struct("ContractRegistry")
            .field("options", &self.options)
            .field("registered", &self.sources.len())
            .field("modifiers", &self.modifiers.len())
            .field("cached", &cached)
            .finish()
    }
}
