//! Naming conventions used to derive controller route paths.

use convert_case::{Boundary, Case, Casing};

/// Digits stay attached to the word they follow; only a digit followed by
/// an upper-case letter starts a new word.
const DIGIT_BOUNDARIES: [Boundary; 3] = [
    Boundary::LowerDigit,
    Boundary::UpperDigit,
    Boundary::DigitLower,
];

/// Convert a mixed-case identifier to lower snake case.
///
/// Snake-case input comes back unchanged.
///
/// ```
/// use trellis::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("UserAccount"), "user_account");
/// assert_eq!(to_snake_case("User2"), "user2");
/// assert_eq!(to_snake_case("show"), "show");
/// ```
pub fn to_snake_case(identifier: &str) -> String {
    identifier
        .remove_boundaries(&DIGIT_BOUNDARIES)
        .to_case(Case::Snake)
}

/// Last path segment of a type's name, generic arguments removed.
///
/// `my_app::controllers::UserAccount<Db>` becomes `UserAccount`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UserAccount;
    #[allow(dead_code)]
    struct Wrapper<T>(T);

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("User"), "user");
        assert_eq!(to_snake_case("UserAccount"), "user_account");
        assert_eq!(to_snake_case("userAccount"), "user_account");
        assert_eq!(to_snake_case("HTMLParser"), "html_parser");
        assert_eq!(to_snake_case("ShowParams"), "show_params");
    }

    #[test]
    fn test_snake_case_is_stable() {
        assert_eq!(to_snake_case("show"), "show");
        assert_eq!(to_snake_case("list_all"), "list_all");
        assert_eq!(to_snake_case("show_v2"), "show_v2");
        assert_eq!(to_snake_case("get_item2"), "get_item2");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_digits_stay_with_their_word() {
        assert_eq!(to_snake_case("User2"), "user2");
        assert_eq!(to_snake_case("ShowV2"), "show_v2");
        assert_eq!(to_snake_case("OAuth2Client"), "o_auth2_client");
        assert_eq!(to_snake_case("Http2Stream"), "http2_stream");
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<UserAccount>(), "UserAccount");
        assert_eq!(short_type_name::<Wrapper<UserAccount>>(), "Wrapper");
        assert_eq!(short_type_name::<u32>(), "u32");
    }
}
