/// Return `list` without the elements that appear in `remove`, preserving order.
pub fn remove_list_from_list(list: &[String], remove: &[String]) -> Vec<String> {
    list.iter()
        .filter(|item| !remove.contains(*item))
        .cloned()
        .collect()
}
