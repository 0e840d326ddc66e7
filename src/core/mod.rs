// Core algorithm exports
pub mod distance;
pub mod matcher;
pub mod nearby;
pub mod prompt;

pub use distance::haversine_distance;
pub use matcher::{parse_candidates, FoodMatcher, MatchCandidate, MatchError};
pub use nearby::{filter_nearby, NearbyParamError, NearbySearch, DEFAULT_RADIUS_KM};
pub use prompt::{build_chat_prompt, build_match_prompt};
