//! GraphQL scalar definitions.

pub mod decimal {
    //! Helpers for [`Decimal`]-backed scalars, to be used in
    //! `#[graphql(with = ..)]` attribute.
    //!
    //! Values are output as strings to keep their precision, while both
    //! strings and numbers are accepted as input.

    use std::{fmt, str::FromStr as _};

    use juniper::{
        InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
        ScalarValue, Value,
    };
    use rust_decimal::Decimal;

    /// Converts the target type into a string scalar [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        T: Copy + Into<Decimal>,
        S: ScalarValue,
    {
        Value::from((*value).into().normalize().to_string())
    }

    /// Constructs the target type from a string or a number scalar
    /// [`InputValue`].
    ///
    /// # Errors
    ///
    /// If the input value is not a decimal number, or doesn't fit into the
    /// target type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        T: TryFrom<Decimal>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let dec = if let Some(s) = input.as_string_value() {
            Decimal::from_str(s.trim())
                .map_err(|e| format!("Cannot parse decimal from \"{s}\": {e}"))
        } else if let Some(i) = input.as_int_value() {
            Ok(Decimal::from(i))
        } else if let Some(f) = input.as_float_value() {
            Decimal::try_from(f)
                .map_err(|e| format!("Cannot parse decimal from `{f}`: {e}"))
        } else {
            Err(format!(
                "Expected string or number decimal input, found: {input}",
            ))
        }?;
        T::try_from(dec).map_err(|e| format!("Invalid decimal `{dec}`: {e}"))
    }

    /// Parses the provided [`ScalarToken`] as either a string or a number.
    ///
    /// # Errors
    ///
    /// If the token is not a valid string or number.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        match value {
            ScalarToken::String(_) => {
                <String as ParseScalarValue<S>>::from_str(value)
            }
            ScalarToken::Int(_) => {
                <i32 as ParseScalarValue<S>>::from_str(value)
            }
            ScalarToken::Float(_) => {
                <f64 as ParseScalarValue<S>>::from_str(value)
            }
        }
    }
}
