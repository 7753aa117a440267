use std::error::Error;

use bytes::BytesMut;
use postgres::types::{IsNull, ToSql, Type, to_sql_checked};

use crate::types::SqlValue;

/// Container for driver parameters with lifetime tracking.
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    /// Borrow a `SqlValue` slice in the trait-object form the driver takes.
    #[must_use]
    pub fn convert(params: &'a [SqlValue]) -> Params<'a> {
        let references: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        Params { references }
    }

    /// The borrowed parameter array.
    #[must_use]
    pub fn as_refs(&self) -> &[&'a (dyn ToSql + Sync)] {
        &self.references
    }
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        // Numeric and date slots are written at the width the statement
        // inferred; the delegated impls never narrow on their own.
        match self {
            SqlValue::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                _ => (*i).to_sql(ty, out),
            },
            SqlValue::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => (*f).to_sql(ty, out),
            },
            SqlValue::Text(s) => s.to_sql(ty, out),
            SqlValue::Bool(b) => (*b).to_sql(ty, out),
            SqlValue::Timestamp(dt) => match *ty {
                Type::DATE => dt.date().to_sql(ty, out),
                Type::TIMESTAMPTZ => dt.and_utc().to_sql(ty, out),
                _ => dt.to_sql(ty, out),
            },
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Json(value) => value.to_sql(ty, out),
            SqlValue::Bytes(bytes) => bytes.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        // Only the types the enum can represent
        match *ty {
            Type::INT2 | Type::INT4 | Type::INT8 => true,
            Type::FLOAT4 | Type::FLOAT8 => true,
            Type::TEXT | Type::VARCHAR | Type::CHAR | Type::NAME => true,
            Type::BOOL => true,
            Type::TIMESTAMP | Type::TIMESTAMPTZ | Type::DATE => true,
            Type::JSON | Type::JSONB => true,
            Type::BYTEA => true,
            _ => false,
        }
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converted_refs_keep_order_and_arity() {
        let values = vec![
            SqlValue::Int(1),
            SqlValue::Text("a".into()),
            SqlValue::Null,
        ];
        let params = Params::convert(&values);
        assert_eq!(params.as_refs().len(), 3);
    }

    #[test]
    fn accepts_covers_enum_representable_types() {
        assert!(<SqlValue as ToSql>::accepts(&Type::INT8));
        assert!(<SqlValue as ToSql>::accepts(&Type::TEXT));
        assert!(<SqlValue as ToSql>::accepts(&Type::TIMESTAMPTZ));
        assert!(<SqlValue as ToSql>::accepts(&Type::JSONB));
        assert!(!<SqlValue as ToSql>::accepts(&Type::NUMERIC));
        assert!(!<SqlValue as ToSql>::accepts(&Type::UUID));
    }

    #[test]
    fn binds_write_the_width_the_slot_asks_for() {
        let mut buf = BytesMut::new();
        SqlValue::Int(1).to_sql(&Type::INT2, &mut buf).unwrap();
        assert_eq!(buf.len(), 2);

        buf.clear();
        SqlValue::Int(1).to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(buf.len(), 4);

        buf.clear();
        SqlValue::Int(1).to_sql(&Type::INT8, &mut buf).unwrap();
        assert_eq!(buf.len(), 8);

        buf.clear();
        SqlValue::Float(1.5).to_sql(&Type::FLOAT4, &mut buf).unwrap();
        assert_eq!(buf.len(), 4);

        buf.clear();
        SqlValue::Float(1.5).to_sql(&Type::FLOAT8, &mut buf).unwrap();
        assert_eq!(buf.len(), 8);

        buf.clear();
        let dt = chrono::NaiveDateTime::parse_from_str("2021-08-06 16:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        SqlValue::Timestamp(dt).to_sql(&Type::DATE, &mut buf).unwrap();
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn out_of_range_narrowing_fails_before_the_wire() {
        let mut buf = BytesMut::new();
        let too_big = i64::from(i32::MAX) + 1;
        assert!(SqlValue::Int(too_big).to_sql(&Type::INT4, &mut buf).is_err());
        assert!(SqlValue::Int(40_000).to_sql(&Type::INT2, &mut buf).is_err());
    }
}
