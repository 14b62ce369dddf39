//! RecordId 和缺省布尔字段的 serde 辅助
//!
//! RecordId 有两种来源格式：API JSON 里的 "table:id" 字符串，
//! 和 SurrealDB 原生的结构化形式。反序列化时两种都要接受，
//! 序列化时统一输出 "table:id" 字符串。
//!
//! 注意不能用 untagged enum 做这件事：SurrealDB 的反序列化器
//! 不支持 untagged 枚举输入，必须走 `deserialize_any` 的 Visitor。

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;
use surrealdb::RecordId;

/// bool 字段缺失或为 null 时取 true (如 `staff.is_active`)
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// bool 字段缺失或为 null 时取 false (如 `order.bill_is_settle`)
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// 同时接受字符串和原生 RecordId 输入
struct AnyRecordId(RecordId);

impl<'de> Deserialize<'de> for AnyRecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AnyRecordIdVisitor;

        impl<'de> Visitor<'de> for AnyRecordIdVisitor {
            type Value = AnyRecordId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a \"table:id\" string or a native RecordId")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse::<RecordId>()
                    .map(AnyRecordId)
                    .map_err(|_| E::custom(format!("invalid RecordId: {}", value)))
            }

            fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                RecordId::deserialize(de::value::MapAccessDeserializer::new(map)).map(AnyRecordId)
            }
        }

        deserializer.deserialize_any(AnyRecordIdVisitor)
    }
}

/// RecordId <-> "table:id" 字符串
pub mod record_id {
    use super::*;

    pub fn serialize<S>(id: &RecordId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
    where
        D: Deserializer<'de>,
    {
        AnyRecordId::deserialize(deserializer).map(|id| id.0)
    }
}

/// Option<RecordId> <-> 可空的 "table:id" 字符串
pub mod option_record_id {
    use super::*;

    pub fn serialize<S>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(id) => s.serialize_some(&id.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<AnyRecordId>::deserialize(deserializer).map(|opt| opt.map(|id| id.0))
    }
}
