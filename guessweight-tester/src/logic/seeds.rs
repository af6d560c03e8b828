use anyhow::{Context, Result};

/// Split a comma-separated CLI list, dropping blanks.
#[must_use]
pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Resolve CLI seed tokens: decimal integers (negative values use their
/// magnitude) or `0x`-prefixed hex.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::with_capacity(tokens.len());
    for token in tokens {
        let seed = if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            u64::from_str_radix(hex, 16).with_context(|| format!("invalid hex seed '{token}'"))?
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed '{token}'"))?
        };
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn seeds_accept_decimal_negative_and_hex() {
        let tokens = split_csv("1337,-5,0x10,18446744073709551615,1337");
        assert_eq!(
            resolve_seed_inputs(&tokens).unwrap(),
            vec![1337, 5, 16, u64::MAX]
        );
    }

    #[test]
    fn garbage_seed_is_an_error() {
        let err = resolve_seed_inputs(&["banana".to_string()]).unwrap_err();
        assert!(err.to_string().contains("banana"));
    }
}
