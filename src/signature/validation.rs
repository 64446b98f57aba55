use crate::protocol::Type;

use super::stack::{stack_peek, stack_pop, stack_try_push, Stack, StackValue};
use super::{SignatureError, SignatureErrorKind, MAX_CONTAINER_DEPTH, MAX_DEPTH, MAX_SIGNATURE};

#[derive(Default, Debug, Clone, Copy)]
pub(super) enum Kind {
    #[default]
    None,
    Array,
    Struct,
    Dict,
}

impl StackValue for (Kind, u8) {
    const DEFAULT: Self = (Kind::None, 0);
}

/// Validate a signature's grammar: balanced parens/braces, `a` followed by
/// exactly one complete type, `{KV}` only directly inside an array with a
/// basic `K`, signature length bounded to 255 bytes.
pub(super) fn validate(bytes: &[u8]) -> Result<(), SignatureError> {
    use SignatureErrorKind::*;

    if bytes.len() > MAX_SIGNATURE {
        return Err(SignatureError::new(SignatureTooLong));
    }

    let mut stack = Stack::<(Kind, u8), MAX_DEPTH>::new();
    let mut arrays = 0;
    let mut structs = 0;

    for &b in bytes {
        let t = Type(b);

        let mut is_basic = if t.is_basic() {
            true
        } else {
            match t {
                Type::ARRAY => {
                    if !stack_try_push!(stack, (Kind::Array, 0)) || arrays == MAX_CONTAINER_DEPTH {
                        return Err(SignatureError::new(ExceededMaximumArrayRecursion));
                    }

                    arrays += 1;
                    continue;
                }
                Type::OPEN_PAREN => {
                    if !stack_try_push!(stack, (Kind::Struct, 0)) || structs == MAX_CONTAINER_DEPTH
                    {
                        return Err(SignatureError::new(ExceededMaximumStructRecursion));
                    }

                    structs += 1;
                    continue;
                }
                Type::CLOSE_PAREN => {
                    let n = match stack_pop!(stack) {
                        Some((Kind::Struct, n)) => n,
                        Some((Kind::Array, _)) => {
                            return Err(SignatureError::new(MissingArrayElementType));
                        }
                        _ => {
                            return Err(SignatureError::new(StructEndedButNotStarted));
                        }
                    };

                    if n == 0 {
                        return Err(SignatureError::new(StructHasNoFields));
                    }

                    structs -= 1;
                    false
                }
                Type::OPEN_BRACE => {
                    if !stack_try_push!(stack, (Kind::Dict, 0)) {
                        return Err(SignatureError::new(ExceededMaximumDictRecursion));
                    }

                    continue;
                }
                Type::CLOSE_BRACE => {
                    let n = match stack_pop!(stack) {
                        Some((Kind::Dict, n)) => n,
                        Some((Kind::Array, _)) => {
                            return Err(SignatureError::new(MissingArrayElementType));
                        }
                        _ => {
                            return Err(SignatureError::new(DictEndedButNotStarted));
                        }
                    };

                    match n {
                        0 => return Err(SignatureError::new(DictEntryHasNoFields)),
                        1 => return Err(SignatureError::new(DictEntryHasOnlyOneField)),
                        2 => {}
                        _ => return Err(SignatureError::new(DictEntryHasTooManyFields)),
                    }

                    if !matches!(stack_peek!(stack), Some((Kind::Array, _))) {
                        return Err(SignatureError::new(DictEntryNotInsideArray));
                    }

                    false
                }
                _ => return Err(SignatureError::new(UnknownTypeCode(t))),
            }
        };

        while let Some((Kind::Array, _)) = stack_peek!(stack) {
            stack_pop!(stack);
            is_basic = false;
        }

        if let Some((Kind::Dict, 0)) = stack_peek!(stack) {
            if !is_basic {
                return Err(SignatureError::new(DictKeyMustBeBasicType));
            }
        }

        if let Some((kind, n)) = stack_pop!(stack) {
            stack_try_push!(stack, (kind, n + 1));
        }
    }

    match stack_pop!(stack) {
        Some((Kind::Array, _)) => return Err(SignatureError::new(MissingArrayElementType)),
        Some((Kind::Struct, _)) => return Err(SignatureError::new(StructStartedButNotEnded)),
        Some((Kind::Dict, _)) => return Err(SignatureError::new(DictStartedButNotEnded)),
        _ => {}
    }

    Ok(())
}
