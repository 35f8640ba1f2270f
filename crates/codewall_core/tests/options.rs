use codewall_core::{
    container_class, Aesthetic, ControlChange, ControlId, OptionError, OptionSet, StyleClass,
    HIDE_COMMENTS_CLASS,
};

#[test]
fn control_names_parse_and_unknown_names_are_rejected() {
    for control in ControlId::ALL {
        assert_eq!(control.name().parse::<ControlId>(), Ok(control));
    }
    assert_eq!(
        "styleselect".parse::<ControlId>(),
        Err(OptionError::UnknownControl("styleselect".to_string()))
    );
}

#[test]
fn style_switch_replaces_previous_class_exactly() {
    let mut options = OptionSet::default();
    let mut previous = options.style;

    for style in [StyleClass::Tyrell, StyleClass::Delos, StyleClass::WeylandYutani] {
        let change = options
            .apply(ControlId::StyleSelect, style.class_name())
            .unwrap();
        assert_eq!(
            change,
            ControlChange::Style {
                previous,
                current: style
            }
        );

        let class = container_class(options.style, false);
        let classes: Vec<&str> = class.split(' ').collect();
        assert_eq!(classes, vec![style.class_name()]);
        previous = style;
    }
}

#[test]
fn container_class_holds_one_style_plus_modifier() {
    for style in StyleClass::ALL {
        let class = container_class(style, true);
        let styles = StyleClass::ALL
            .iter()
            .filter(|candidate| class.split(' ').any(|c| c == candidate.class_name()))
            .count();
        assert_eq!(styles, 1);
        assert!(class.split(' ').any(|c| c == HIDE_COMMENTS_CLASS));
    }
}

#[test]
fn invalid_values_leave_options_untouched() {
    let mut options = OptionSet::default();
    let before = options;

    assert!(options.apply(ControlId::StyleSelect, "comic-sans").is_err());
    assert!(options.apply(ControlId::AestheticSelect, "vaporwave").is_err());
    assert!(options.apply(ControlId::FontSize, "0").is_err());
    assert!(options.apply(ControlId::FontSize, "201").is_err());
    assert!(options.apply(ControlId::FontSize, "12.5").is_err());
    assert!(options.apply(ControlId::HideComments, "sometimes").is_err());

    assert_eq!(options, before);
}

#[test]
fn aesthetic_choice_is_only_recorded() {
    let mut options = OptionSet::default();
    assert_eq!(
        options.apply(ControlId::AestheticSelect, "sadboy"),
        Ok(ControlChange::Aesthetic(Aesthetic::Sadboy))
    );
    assert_eq!(options.aesthetic, Aesthetic::Sadboy);
}
