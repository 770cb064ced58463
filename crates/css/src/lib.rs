pub mod matching;
pub mod query;
pub mod syntax;

// Re-exports so other crates can just use `css::...` nicely.
pub use matching::{matches_complex, matches_list};
pub use query::{
    closest, matches, query_selector, query_selector_all, query_selector_all_inclusive,
    select_all,
};
pub use syntax::{
    AttrOp, Combinator, ComplexSelector, Compound, Selector, SelectorError, SelectorList,
    parse_selector_list,
};
