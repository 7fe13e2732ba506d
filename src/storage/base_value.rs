use super::WindowStorage;
use crate::{
    encoding::{keycode, KeyBuilder, Value},
    error::{Error, Result, ResultExt},
    iterator::PrefixIter,
    model::{DataType, JoinType, WindowBaseValue, WindowType},
    store::Store,
};

/// Scan prefix for the base values of one window instance.
///
/// ```text
/// Normal / Session: tag | shuffle_id | window_instance_id | window type
/// Join:             tag | shuffle_id | window_instance_id | window type | join type
/// ```
///
/// Write keys append the value's identity as the last segment.
fn base_value_prefix(
    shuffle_id: &str,
    window_instance_id: &str,
    window_type: WindowType,
    join_type: Option<JoinType>,
) -> Result<KeyBuilder> {
    let prefix = KeyBuilder::new(DataType::WindowBaseValue)
        .segment(shuffle_id)
        .segment(window_instance_id)
        .segment(window_type.name());

    match window_type {
        WindowType::Normal | WindowType::Session => Ok(prefix),
        WindowType::Join => {
            let join_type = join_type.ok_or(Error::MissingJoinType)?;
            Ok(prefix.segment(join_type.name()))
        }
    }
}

/// Identity segment of a value stored under `window_type`.
fn base_value_identity(
    window_type: WindowType,
    join_type: Option<JoinType>,
    value: &WindowBaseValue,
) -> Result<&str> {
    match (window_type, value) {
        (WindowType::Normal, WindowBaseValue::Aggregate(state)) => Ok(&state.msg_key),
        (WindowType::Session, WindowBaseValue::Session(state)) => Ok(&state.msg_key),
        (WindowType::Join, WindowBaseValue::Join(state)) if join_type == Some(state.side) => {
            Ok(&state.message_id)
        }
        (WindowType::Join, WindowBaseValue::Join(state)) => Err(Error::WindowKindMismatch {
            expected: join_type.map_or("no join type", |side| side.name()),
            found: state.side.name(),
        }),
        (expected, value) => Err(Error::WindowKindMismatch {
            expected: expected.name(),
            found: value.window_type().name(),
        }),
    }
}

/// Recover the identity segment from a key found under `prefix`.
fn identity_from_key(key: &[u8], prefix: &[u8]) -> Result<String> {
    let (identity, rest) = keycode::decode_segment(&key[prefix.len()..])?;
    if !rest.is_empty() {
        return Err(crate::encoding::EncodingError::InvalidFormat(
            "Trailing segments after base value identity".to_string(),
        )
        .into());
    }
    Ok(identity)
}

impl<S: Store> WindowStorage<S> {
    /// Write each value under its identity key.
    ///
    /// Every value is checked against the window kind before the first write,
    /// so a mismatched slice writes nothing. Writes are still issued one by
    /// one, not as an atomic batch. Values with an empty identity are
    /// skipped. An empty slice is a no-op.
    pub fn put_window_base_value(
        &self,
        shuffle_id: &str,
        window_instance_id: &str,
        window_type: WindowType,
        join_type: Option<JoinType>,
        values: &[WindowBaseValue],
    ) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }

        let prefix = base_value_prefix(shuffle_id, window_instance_id, window_type, join_type)?;
        for value in values {
            base_value_identity(window_type, join_type, value)?;
        }

        for value in values {
            self.write_base_value(&prefix, window_type, join_type, value)?;
        }
        Ok(())
    }

    /// Like [`put_window_base_value`](Self::put_window_base_value), but drains
    /// an iterator. Used to move state between window instances without
    /// collecting it first; the first failing item stops the copy.
    ///
    /// Returns the number of values written.
    pub fn put_window_base_value_from_iter<I>(
        &self,
        shuffle_id: &str,
        window_instance_id: &str,
        window_type: WindowType,
        join_type: Option<JoinType>,
        values: I,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = Result<WindowBaseValue>>,
    {
        let prefix = base_value_prefix(shuffle_id, window_instance_id, window_type, join_type)?;

        let mut written = 0;
        for value in values {
            if self.write_base_value(&prefix, window_type, join_type, &value?)? {
                written += 1;
            }
        }

        tracing::debug!(shuffle_id, window_instance_id, %window_type, written, "Copied window base values");
        Ok(written)
    }

    fn write_base_value(
        &self,
        prefix: &KeyBuilder,
        window_type: WindowType,
        join_type: Option<JoinType>,
        value: &WindowBaseValue,
    ) -> Result<bool> {
        let identity = base_value_identity(window_type, join_type, value)?;
        if identity.is_empty() {
            tracing::debug!(%window_type, "Skipping window base value without identity");
            return Ok(false);
        }

        let key = prefix.clone().segment(identity).build();
        let encoded = value.encode().op("put_window_base_value")?;
        self.store.put(&key, &encoded).op("put_window_base_value")?;
        Ok(true)
    }

    /// Scan the base values of one window instance (and join side).
    pub fn get_window_base_value(
        &self,
        shuffle_id: &str,
        window_instance_id: &str,
        window_type: WindowType,
        join_type: Option<JoinType>,
    ) -> Result<PrefixIter<S::ScanIterator<'_>, WindowBaseValue>> {
        let prefix = base_value_prefix(shuffle_id, window_instance_id, window_type, join_type)?;
        Ok(self.scan(prefix.as_bytes(), "get_window_base_value"))
    }

    /// Delete every base value of one window instance (and join side).
    ///
    /// The prefix is scanned to completion before the first delete is issued.
    /// Deletes are independent; if one fails, earlier ones stay applied and
    /// the call can simply be repeated. Returns the number of deletes issued.
    pub fn delete_window_base_values(
        &self,
        shuffle_id: &str,
        window_instance_id: &str,
        window_type: WindowType,
        join_type: Option<JoinType>,
    ) -> Result<usize> {
        let prefix = base_value_prefix(shuffle_id, window_instance_id, window_type, join_type)?;

        let mut identities = Vec::new();
        for key in self
            .scan::<WindowBaseValue>(prefix.as_bytes(), "delete_window_base_values")
            .keys()
        {
            let key = key?;
            match identity_from_key(&key, prefix.as_bytes()) {
                Ok(identity) => identities.push(identity),
                Err(e) => {
                    tracing::warn!(error = %e, key = ?key, "Skipping base value with undecodable key")
                }
            }
        }

        for identity in &identities {
            let key = prefix.clone().segment(identity).build();
            self.store.delete(&key).op("delete_window_base_values")?;
        }

        tracing::debug!(
            shuffle_id,
            window_instance_id,
            %window_type,
            deleted = identities.len(),
            "Deleted window base values"
        );
        Ok(identities.len())
    }

    /// Delete one base value by identity (`msg_key`, or `message_id` for
    /// join windows). Uses the same key layout as writes. Empty identities
    /// are ignored.
    pub fn delete_window_base_value(
        &self,
        shuffle_id: &str,
        window_instance_id: &str,
        window_type: WindowType,
        join_type: Option<JoinType>,
        identity: &str,
    ) -> Result<()> {
        if identity.is_empty() {
            return Ok(());
        }

        let key = base_value_prefix(shuffle_id, window_instance_id, window_type, join_type)?
            .segment(identity)
            .build();
        self.store.delete(&key).op("delete_window_base_value")
    }
}
