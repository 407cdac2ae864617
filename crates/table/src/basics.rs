/// Sorts `names` and drops duplicates.
///
/// The result is strictly ascending and holds exactly the distinct input
/// values, whatever the input order or multiplicities.
pub fn uniq(mut names: Vec<String>) -> Vec<String> {
    names.sort_unstable();
    names.dedup();
    names
}
