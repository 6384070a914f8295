//! Deterministic EIP-712 encoding over a runtime [`TypeSchema`].

use super::{Domain, TypeSchema, TypedField, EIP712_DOMAIN_TYPE};
use crate::error::TypedDataError;

use alloy::primitives::{B256, U256};
use serde_json::Value;
use sha3::{Digest, Keccak256};
use std::collections::BTreeSet;

fn keccak(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

// ─── Type strings ────────────────────────────────────────────────────────────

/// `encodeType`: the primary type followed by every referenced struct type
/// sorted by name, each rendered as `Name(type1 name1,type2 name2)`.
pub fn encode_type(schema: &TypeSchema, primary_type: &str) -> Result<String, TypedDataError> {
    let mut found = BTreeSet::new();
    let mut stack = Vec::new();
    collect_dependencies(schema, primary_type, &mut found, &mut stack)?;
    found.remove(primary_type);

    let mut out = render_struct(primary_type, struct_fields(schema, primary_type)?);
    for dep in &found {
        out.push_str(&render_struct(dep, struct_fields(schema, dep)?));
    }
    Ok(out)
}

/// `typeHash = keccak256(encodeType(type))`.
pub fn type_hash(schema: &TypeSchema, type_name: &str) -> Result<B256, TypedDataError> {
    Ok(B256::from(keccak(encode_type(schema, type_name)?.as_bytes())))
}

fn render_struct(name: &str, fields: &[TypedField]) -> String {
    let members: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.kind, f.name))
        .collect();
    format!("{}({})", name, members.join(","))
}

fn struct_fields<'a>(
    schema: &'a TypeSchema,
    type_name: &str,
) -> Result<&'a [TypedField], TypedDataError> {
    schema
        .get(type_name)
        .map(Vec::as_slice)
        .ok_or_else(|| TypedDataError::UnknownType(type_name.to_string()))
}

fn collect_dependencies(
    schema: &TypeSchema,
    type_name: &str,
    found: &mut BTreeSet<String>,
    stack: &mut Vec<String>,
) -> Result<(), TypedDataError> {
    let base = base_type(type_name)?;
    if !schema.contains_key(base) {
        if is_atomic(base) {
            return Ok(());
        }
        return Err(TypedDataError::UnknownType(base.to_string()));
    }
    if stack.iter().any(|t| t == base) {
        return Err(TypedDataError::CyclicType(base.to_string()));
    }
    if found.contains(base) {
        return Ok(());
    }

    found.insert(base.to_string());
    stack.push(base.to_string());
    for field in struct_fields(schema, base)? {
        collect_dependencies(schema, &field.kind, found, stack)?;
    }
    stack.pop();
    Ok(())
}

/// Strip all array suffixes: `Person[][3]` → `Person`.
fn base_type(ty: &str) -> Result<&str, TypedDataError> {
    let mut element = ty;
    while let Some((inner, _)) = split_array(element)? {
        element = inner;
    }
    if element.contains('[') || element.contains(']') {
        return Err(TypedDataError::UnknownType(ty.to_string()));
    }
    Ok(element)
}

/// Split the outermost array suffix: `uint8[][4]` → (`uint8[]`, Some(4)).
///
/// A length that is neither empty nor a decimal number (`uint8[abc]`) is an
/// unknown type.
fn split_array(ty: &str) -> Result<Option<(&str, Option<usize>)>, TypedDataError> {
    if !ty.ends_with(']') {
        return Ok(None);
    }
    let open = ty
        .rfind('[')
        .ok_or_else(|| TypedDataError::UnknownType(ty.to_string()))?;
    let len = &ty[open + 1..ty.len() - 1];
    let fixed = if len.is_empty() {
        None
    } else {
        let n = len
            .parse::<usize>()
            .map_err(|_| TypedDataError::UnknownType(ty.to_string()))?;
        Some(n)
    };
    Ok(Some((&ty[..open], fixed)))
}

fn sized(ty: &str, prefix: &str) -> Option<usize> {
    ty.strip_prefix(prefix)?.parse().ok()
}

fn int_bits(ty: &str, prefix: &str) -> Option<usize> {
    sized(ty, prefix).filter(|bits| *bits >= 8 && *bits <= 256 && bits % 8 == 0)
}

fn is_atomic(ty: &str) -> bool {
    match ty {
        "address" | "bool" | "string" | "bytes" => true,
        _ => {
            sized(ty, "bytes").is_some_and(|n| (1..=32).contains(&n))
                || int_bits(ty, "uint").is_some()
                || int_bits(ty, "int").is_some()
        }
    }
}

// ─── Data encoding ───────────────────────────────────────────────────────────

/// `encodeData`: `typeHash ‖ enc(field₁) ‖ … ‖ enc(fieldₙ)`, fields in
/// declaration order.
pub fn encode_data(
    schema: &TypeSchema,
    type_name: &str,
    data: &Value,
) -> Result<Vec<u8>, TypedDataError> {
    let fields = struct_fields(schema, type_name)?;
    let object = data.as_object().ok_or_else(|| TypedDataError::InvalidValue {
        field: type_name.to_string(),
        kind: type_name.to_string(),
        reason: "expected an object".to_string(),
    })?;

    let mut out = Vec::with_capacity(32 * (fields.len() + 1));
    out.extend_from_slice(type_hash(schema, type_name)?.as_slice());
    for field in fields {
        let value = object
            .get(&field.name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| TypedDataError::FieldMismatch {
                type_name: type_name.to_string(),
                field: field.name.clone(),
            })?;
        out.extend_from_slice(&encode_value(schema, &field.name, &field.kind, value)?);
    }
    Ok(out)
}

/// `hashStruct(type, data) = keccak256(encodeData(type, data))`.
pub fn hash_struct(
    schema: &TypeSchema,
    type_name: &str,
    data: &Value,
) -> Result<B256, TypedDataError> {
    Ok(B256::from(keccak(&encode_data(schema, type_name, data)?)))
}

/// `hashStruct(EIP712Domain, domain)` over the fields present in `domain`.
pub fn domain_separator(domain: &Domain) -> Result<B256, TypedDataError> {
    let mut schema = TypeSchema::new();
    schema.insert(EIP712_DOMAIN_TYPE.to_string(), domain.type_fields());
    hash_struct(&schema, EIP712_DOMAIN_TYPE, &domain.to_message())
}

/// `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(message))`.
pub fn signing_hash(
    schema: &TypeSchema,
    domain: &Domain,
    primary_type: &str,
    message: &Value,
) -> Result<B256, TypedDataError> {
    let mut buf = Vec::with_capacity(66);
    buf.extend_from_slice(&[0x19, 0x01]);
    buf.extend_from_slice(domain_separator(domain)?.as_slice());
    buf.extend_from_slice(hash_struct(schema, primary_type, message)?.as_slice());
    Ok(B256::from(keccak(&buf)))
}

fn invalid(field: &str, kind: &str, reason: impl Into<String>) -> TypedDataError {
    TypedDataError::InvalidValue {
        field: field.to_string(),
        kind: kind.to_string(),
        reason: reason.into(),
    }
}

fn encode_value(
    schema: &TypeSchema,
    field: &str,
    kind: &str,
    value: &Value,
) -> Result<[u8; 32], TypedDataError> {
    if let Some((element, fixed_len)) = split_array(kind)? {
        let items = value
            .as_array()
            .ok_or_else(|| invalid(field, kind, "expected an array"))?;
        if let Some(len) = fixed_len {
            if items.len() != len {
                return Err(invalid(
                    field,
                    kind,
                    format!("expected {} elements, got {}", len, items.len()),
                ));
            }
        }
        let mut buf = Vec::with_capacity(32 * items.len());
        for item in items {
            buf.extend_from_slice(&encode_value(schema, field, element, item)?);
        }
        return Ok(keccak(&buf));
    }

    if schema.contains_key(kind) {
        return Ok(keccak(&encode_data(schema, kind, value)?));
    }

    match kind {
        "string" => {
            let s = value
                .as_str()
                .ok_or_else(|| invalid(field, kind, "expected a string"))?;
            Ok(keccak(s.as_bytes()))
        }
        "bytes" => Ok(keccak(&hex_bytes(field, kind, value)?)),
        "bool" => {
            let flag = match value {
                Value::Bool(b) => *b,
                Value::String(s) if s == "true" => true,
                Value::String(s) if s == "false" => false,
                _ => return Err(invalid(field, kind, "expected a boolean")),
            };
            let mut word = [0u8; 32];
            word[31] = flag as u8;
            Ok(word)
        }
        "address" => {
            let raw = hex_bytes(field, kind, value)?;
            if raw.len() != 20 {
                return Err(invalid(field, kind, "expected 20 bytes"));
            }
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(&raw);
            Ok(word)
        }
        _ => {
            if let Some(size) = sized(kind, "bytes").filter(|n| (1..=32).contains(n)) {
                let raw = hex_bytes(field, kind, value)?;
                if raw.len() > size {
                    return Err(invalid(field, kind, format!("longer than {} bytes", size)));
                }
                let mut word = [0u8; 32];
                word[..raw.len()].copy_from_slice(&raw);
                return Ok(word);
            }
            if let Some(bits) = int_bits(kind, "uint") {
                return encode_uint(field, kind, bits, value);
            }
            if let Some(bits) = int_bits(kind, "int") {
                return encode_int(field, kind, bits, value);
            }
            Err(TypedDataError::UnknownType(kind.to_string()))
        }
    }
}

fn hex_bytes(field: &str, kind: &str, value: &Value) -> Result<Vec<u8>, TypedDataError> {
    let s = value
        .as_str()
        .ok_or_else(|| invalid(field, kind, "expected a 0x-prefixed hex string"))?;
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| invalid(field, kind, "expected a 0x-prefixed hex string"))?;
    let padded;
    let digits = if digits.len() % 2 == 1 {
        padded = format!("0{}", digits);
        padded.as_str()
    } else {
        digits
    };
    hex::decode(digits).map_err(|e| invalid(field, kind, e.to_string()))
}

/// Parse an unsigned magnitude from a JSON number, decimal string or 0x hex.
fn parse_magnitude(field: &str, kind: &str, s: &str) -> Result<U256, TypedDataError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(s, 10),
    };
    parsed.map_err(|e| invalid(field, kind, e.to_string()))
}

/// Returns `(negative, magnitude)`.
fn parse_integer(field: &str, kind: &str, value: &Value) -> Result<(bool, U256), TypedDataError> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok((false, U256::from(u)))
            } else if let Some(i) = n.as_i64() {
                Ok((true, U256::from(i.unsigned_abs())))
            } else {
                Err(invalid(field, kind, "floating point values are not allowed"))
            }
        }
        Value::String(s) => match s.trim().strip_prefix('-') {
            Some(rest) => Ok((true, parse_magnitude(field, kind, rest)?)),
            None => Ok((false, parse_magnitude(field, kind, s)?)),
        },
        _ => Err(invalid(field, kind, "expected an integer")),
    }
}

fn encode_uint(field: &str, kind: &str, bits: usize, value: &Value) -> Result<[u8; 32], TypedDataError> {
    let (negative, magnitude) = parse_integer(field, kind, value)?;
    if negative && !magnitude.is_zero() {
        return Err(invalid(field, kind, "negative value for unsigned type"));
    }
    if bits < 256 && magnitude >= (U256::from(1u8) << bits) {
        return Err(invalid(field, kind, format!("does not fit in {} bits", bits)));
    }
    Ok(magnitude.to_be_bytes::<32>())
}

fn encode_int(field: &str, kind: &str, bits: usize, value: &Value) -> Result<[u8; 32], TypedDataError> {
    let (negative, magnitude) = parse_integer(field, kind, value)?;
    let limit = U256::from(1u8) << (bits - 1);
    let in_range = if negative { magnitude <= limit } else { magnitude < limit };
    if !in_range {
        return Err(invalid(field, kind, format!("does not fit in {} bits", bits)));
    }
    let raw = if negative {
        U256::ZERO.wrapping_sub(magnitude)
    } else {
        magnitude
    };
    Ok(raw.to_be_bytes::<32>())
}
