//! Ordering of the files packed from a directory

use std::cmp::Ordering;

use itertools::Itertools;

/// How the files of a directory are laid out in the archive
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Layout {
    /// Every file in the directory, grouped by asset kind then in natural order
    #[default]
    Natural,
    /// The fixed list of files shipped with the FusionFall client
    FusionFall,
}

/// Files of the FusionFall client archive, `mainData` sits at index 15
pub const FUSIONFALL_MANIFEST: [&str; 17] = [
    "Assembly - CSharp - first pass.dll",
    "Assembly - CSharp.dll",
    "Assembly - UnityScript - first pass.dll",
    "Mono.Data.Tds.dll",
    "Mono.Security.dll",
    "System.Configuration.Install.dll",
    "System.Configuration.dll",
    "System.Data.dll",
    "System.Drawing.dll",
    "System.EnterpriseServices.dll",
    "System.Security.dll",
    "System.Transactions.dll",
    "System.Xml.dll",
    "System.dll",
    "mysql.data.dll",
    "mainData",
    "sharedassets0.assets",
];

fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
    name.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Sorting group of a file, lower groups come first
pub fn category(name: &str) -> u8 {
    let is_dll = name.len() >= 4
        && name.is_char_boundary(name.len() - 4)
        && name[name.len() - 4..].eq_ignore_ascii_case(".dll");

    if is_dll {
        if starts_with_ignore_case(name, "Assembly") {
            return 0;
        }
        if ["Mono", "System", "UnityEngine"]
            .iter()
            .any(|prefix| starts_with_ignore_case(name, prefix))
            || name.eq_ignore_ascii_case("mscorlib.dll")
        {
            return 1;
        }
        return 2;
    }

    if name.eq_ignore_ascii_case("mainData") {
        3
    } else if starts_with_ignore_case(name, "level") {
        4
    } else if starts_with_ignore_case(name, "sharedassets") {
        5
    } else if starts_with_ignore_case(name, "resources") {
        6
    } else {
        7
    }
}

/// Case insensitive comparison where digit runs compare by value.
///
/// Equal values with more leading zeros sort after the shorter run.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let (si, sj) = (i, j);
            while i < a.len() && a[i].is_ascii_digit() {
                i += 1;
            }
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }

            let ord = cmp_digits(&a[si..i], &b[sj..j]).then((i - si).cmp(&(j - sj)));
            if ord != Ordering::Equal {
                return ord;
            }
            continue;
        }

        let ord = a[i].to_ascii_uppercase().cmp(&b[j].to_ascii_uppercase());
        if ord != Ordering::Equal {
            return ord;
        }
        i += 1;
        j += 1;
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn cmp_digits(a: &[u8], b: &[u8]) -> Ordering {
    let trim = |digits: &[u8]| {
        let start = digits.iter().position(|d| *d != b'0').unwrap_or(digits.len());
        digits[start..].to_vec()
    };
    let (a, b) = (trim(a), trim(b));

    a.len().cmp(&b.len()).then_with(|| a.cmp(&b))
}

/// Order names by [`category`] then by [`natural_cmp`]
pub fn sort_names<I, S>(names: I) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .sorted_by(|a, b| {
            let (a, b) = (a.as_ref(), b.as_ref());
            category(a)
                .cmp(&category(b))
                .then_with(|| natural_cmp(a, b))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::cmp::Ordering;

    use super::{category, natural_cmp, sort_names, FUSIONFALL_MANIFEST};

    #[test]
    fn categories() {
        assert_eq!(category("Assembly - CSharp.dll"), 0);
        assert_eq!(category("assembly-unityscript.DLL"), 0);
        assert_eq!(category("System.Xml.dll"), 1);
        assert_eq!(category("mscorlib.dll"), 1);
        assert_eq!(category("UnityEngine.dll"), 1);
        assert_eq!(category("mysql.data.dll"), 2);
        assert_eq!(category("maindata"), 3);
        assert_eq!(category("level12"), 4);
        assert_eq!(category("sharedassets0.assets"), 5);
        assert_eq!(category("resources.assets"), 6);
        assert_eq!(category("System.txt"), 7);
        assert_eq!(category("readme"), 7);
    }

    #[test]
    fn natural_order() {
        assert_eq!(natural_cmp("level2", "level10"), Ordering::Less);
        assert_eq!(natural_cmp("Level2", "level2"), Ordering::Equal);
        assert_eq!(natural_cmp("level2", "level02"), Ordering::Less);
        assert_eq!(natural_cmp("level", "level0"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "ABD"), Ordering::Less);
        assert_eq!(
            natural_cmp("sharedassets99999999999999999999", "sharedassets100000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn directory_order() {
        let names = vec![
            "sharedassets10.assets",
            "readme.txt",
            "level1",
            "mainData",
            "sharedassets2.assets",
            "mysql.data.dll",
            "System.dll",
            "Assembly - CSharp.dll",
            "resources.assets",
            "level0",
        ];

        assert_eq!(
            sort_names(names),
            vec![
                "Assembly - CSharp.dll",
                "System.dll",
                "mysql.data.dll",
                "mainData",
                "level0",
                "level1",
                "sharedassets2.assets",
                "sharedassets10.assets",
                "resources.assets",
                "readme.txt",
            ]
        );
    }

    #[test]
    fn manifest_keeps_main_data_at_marker() {
        assert_eq!(FUSIONFALL_MANIFEST[15], "mainData");
        assert_eq!(FUSIONFALL_MANIFEST.len(), 17);
    }
}
