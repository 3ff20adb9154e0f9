//! Teacher-name recognition based on honorific prefixes

/// Valid prefixes, in the order teachers are listed
pub const PREFIX_HIERARCHY: [&str; 9] = [
    "Ms", "Mrs", "Miss", "Ma'am", "Maam", "Mr", "Sir", "Dr", "Prof",
];

/// Rank of the honorific a word starts with, if it is one.
///
/// `Mr.`, `MR`, `mr` and `Dr.Smith` all count; `Mission` does not.
pub fn prefix_rank(word: &str) -> Option<usize> {
    let word = word.trim().trim_matches(',').replace('’', "'");
    let head = word.split('.').next().unwrap_or_default();
    PREFIX_HIERARCHY
        .iter()
        .position(|prefix| prefix.eq_ignore_ascii_case(head))
}

/// Split a string into teacher names, one per honorific.
///
/// `"Mr. John Dr. Smith"` -> `["MR. JOHN", "DR. SMITH"]`. Words before the
/// first honorific are dropped, so a string with no honorific yields nothing.
pub fn parse_teachers(text: &str) -> Vec<String> {
    let mut teachers: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        let word = word.trim_matches(',');
        if word.is_empty() {
            continue;
        }
        if prefix_rank(word).is_some() {
            push_teacher(&mut teachers, &current);
            current.clear();
            current.push(word);
        } else if !current.is_empty() {
            current.push(word);
        }
    }
    push_teacher(&mut teachers, &current);

    teachers
}

fn push_teacher(teachers: &mut Vec<String>, words: &[&str]) {
    if words.is_empty() {
        return;
    }
    let name = words.join(" ").to_uppercase();
    if !teachers.contains(&name) {
        teachers.push(name);
    }
}

/// Sort key for a teacher: honorific rank, unknown honorifics last
pub fn teacher_rank(name: &str) -> usize {
    name.split_whitespace()
        .next()
        .and_then(prefix_rank)
        .unwrap_or(PREFIX_HIERARCHY.len())
}

/// Order teachers by honorific rank, then alphabetically
pub fn sort_teachers<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
    names.sort_by(|a, b| {
        teacher_rank(a)
            .cmp(&teacher_rank(b))
            .then_with(|| a.cmp(b))
    });
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_teachers() {
        assert_eq!(
            parse_teachers("Mr. John Dr. Smith"),
            vec!["MR. JOHN", "DR. SMITH"]
        );
    }

    #[test]
    fn test_parse_without_prefix_is_empty() {
        assert!(parse_teachers("John Smith").is_empty());
        assert!(parse_teachers("").is_empty());
    }

    #[test]
    fn test_leading_words_before_prefix_are_dropped() {
        assert_eq!(parse_teachers("Lab Ms. Hina Ali"), vec!["MS. HINA ALI"]);
    }

    #[test]
    fn test_prefix_variants() {
        assert_eq!(prefix_rank("Mr."), Some(5));
        assert_eq!(prefix_rank("MRS"), Some(1));
        assert_eq!(prefix_rank("Ma’am"), Some(3));
        assert_eq!(prefix_rank("Dr.Smith"), Some(7));
        assert_eq!(prefix_rank("Mission"), None);
        assert_eq!(prefix_rank("Sirajuddin"), None);
    }

    #[test]
    fn test_commas_between_names() {
        assert_eq!(
            parse_teachers("Ms. Ayesha, Prof. Kamran Ali,"),
            vec!["MS. AYESHA", "PROF. KAMRAN ALI"]
        );
    }

    #[test]
    fn test_duplicate_names_collapse() {
        assert_eq!(parse_teachers("Dr. Zia Dr. Zia"), vec!["DR. ZIA"]);
    }

    #[test]
    fn test_sort_by_rank_then_name() {
        let sorted = sort_teachers(["DR. AMIR", "MS. ZARA", "MR. BILAL", "MS. ALIA", "KHAN"]);
        assert_eq!(sorted, vec!["MS. ALIA", "MS. ZARA", "MR. BILAL", "DR. AMIR", "KHAN"]);
    }
}
