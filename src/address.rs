use crate::metadata::LocationRecord;
use maud::html;

/// Number of trailing address components shown on the last tooltip line.
const TRAILING: usize = 5;

/// Builds a three line tooltip: file name, the leading address components
/// and the last five components. Short addresses leave the middle line empty.
pub fn tooltip(record: &LocationRecord) -> String {
    let (leading, trailing) = split_components(&record.address_components);
    html! {
        (record.file_name) br;
        (leading.join(" ")) br;
        (trailing.join(" "))
    }
    .into_string()
}

fn split_components(components: &[String]) -> (&[String], &[String]) {
    components.split_at(components.len().saturating_sub(TRAILING))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::split_address;

    const LINE_BREAK: &str = "<br>";

    fn record(address: &str) -> LocationRecord {
        LocationRecord {
            file_name: "IMG_0001.jpg".to_string(),
            full_path: "/home/me/photos/IMG_0001.jpg".to_string(),
            latitude: 48.858222,
            longitude: 2.2945,
            address_components: split_address(address),
        }
    }

    #[test]
    fn three_lines_with_bare_file_name() {
        let r = record("Tour Eiffel, Avenue Anatole France, Paris, Île-de-France, 75007, France");
        assert_eq!(
            tooltip(&r),
            "IMG_0001.jpg<br>Tour Eiffel<br>Avenue Anatole France Paris Île-de-France 75007 France"
        );
    }

    #[test]
    fn short_address_leaves_leading_line_empty() {
        let r = record("123 Main St, Springfield");
        let tip = tooltip(&r);
        let lines: Vec<&str> = tip.split(LINE_BREAK).collect();
        assert_eq!(lines, vec!["IMG_0001.jpg", "", "123 Main St Springfield"]);

        let empty = LocationRecord {
            address_components: vec![],
            ..r
        };
        assert_eq!(tooltip(&empty), "IMG_0001.jpg<br><br>");
    }

    #[test]
    fn long_address_keeps_every_component_once() {
        let r = record("12, Rue de Rivoli, Quartier Saint-Merri, Paris 4e, Paris, Île-de-France, 75004, France");
        let tip = tooltip(&r);
        let lines: Vec<&str> = tip.split(LINE_BREAK).collect();
        assert_eq!(lines[1], "12 Rue de Rivoli Quartier Saint-Merri");
        assert_eq!(lines[2], "Paris 4e Paris Île-de-France 75004 France");
    }

    #[test]
    fn tooltip_is_pure() {
        let r = record("a, b, c, d, e, f, g");
        assert_eq!(tooltip(&r), tooltip(&r));
    }

    #[test]
    fn markup_in_names_is_escaped() {
        let mut r = record("Fish & Chips, <Harbour>");
        r.file_name = "a<b>.jpg".to_string();
        assert_eq!(
            tooltip(&r),
            "a&lt;b&gt;.jpg<br><br>Fish &amp; Chips &lt;Harbour&gt;"
        );
    }
}
