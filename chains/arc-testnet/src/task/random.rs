use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;

const NAME_PREFIXES: [&str; 10] = [
    "arc", "test", "web3", "crypto", "defi", "nft", "meta", "chain", "block", "token",
];
const NAME_SUFFIXES: [&str; 10] = [
    "hub", "world", "lab", "zone", "net", "dao", "fi", "verse", "link", "swap",
];
const BASE36: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random token parameters for one wallet in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub supply: u64,
}

/// `<prefix><suffix><4 base-36 chars>`, always a valid registry name.
/// Collisions are possible and left to the registry to reject.
pub fn random_name<R: Rng>(rng: &mut R) -> String {
    let prefix = NAME_PREFIXES.choose(rng).copied().unwrap_or("arc");
    let suffix = NAME_SUFFIXES.choose(rng).copied().unwrap_or("hub");
    let tail: String = (0..4)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}{}", prefix, suffix, tail)
}

pub fn random_token_config<R: Rng>(rng: &mut R, index: usize) -> TokenConfig {
    let tag: String = (0..6).map(|_| char::from(rng.sample(Alphanumeric))).collect();
    let symbol = format!("TK{}", tag.to_ascii_uppercase().chars().take(4).collect::<String>());

    TokenConfig {
        name: format!("Token{}", tag),
        symbol,
        supply: 1_000_000 + index as u64 * 1000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::validate;

    #[test]
    fn test_random_names_are_valid() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let name = random_name(&mut rng);
            assert!(validate::name(&name).is_ok(), "{} rejected", name);
        }
    }

    #[test]
    fn test_random_token_config_shape() {
        let mut rng = rand::thread_rng();
        let config = random_token_config(&mut rng, 3);

        assert_eq!(config.supply, 1_003_000);
        assert!(config.name.starts_with("Token"));
        assert_eq!(config.symbol.len(), 6);
        assert!(validate::token_name(&config.name).is_ok());
        assert!(validate::symbol(&config.symbol).is_ok());
    }
}
