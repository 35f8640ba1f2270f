use codewall_core::{Aesthetic, EffectPass, KernelSize};

fn labels(aesthetic: Aesthetic) -> Vec<&'static str> {
    aesthetic
        .effect_stack()
        .iter()
        .map(EffectPass::label)
        .collect()
}

#[test]
fn presets_have_fixed_pass_order() {
    assert_eq!(labels(Aesthetic::Gibson), vec!["glitch", "film"]);
    assert_eq!(labels(Aesthetic::Sadboy), vec!["bloom", "film"]);
    assert_eq!(labels(Aesthetic::ScorchedTube), vec!["bloom", "film"]);
    assert_eq!(labels(Aesthetic::Ntef), vec!["bloom", "pixelation", "film"]);
    assert_eq!(
        labels(Aesthetic::BadLifeChoices),
        vec!["bloom", "dot-screen", "film"]
    );
}

#[test]
fn every_preset_ends_with_film_grain() {
    for aesthetic in Aesthetic::ALL {
        let stack = aesthetic.effect_stack();
        assert!(matches!(stack.last(), Some(EffectPass::Film(_))), "{aesthetic}");
    }
}

#[test]
fn scorchedtube_uses_medium_additive_bloom() {
    let stack = Aesthetic::ScorchedTube.effect_stack();
    let EffectPass::Bloom(bloom) = stack[0] else {
        panic!("expected bloom first");
    };
    assert_eq!(bloom.kernel_size, KernelSize::Medium);
    assert_eq!(bloom.intensity, 10.0);
    assert!(!bloom.screen_mode);

    let EffectPass::Film(film) = stack[1] else {
        panic!("expected film second");
    };
    assert_eq!(film.vignette_darkness, 4.0);
    assert!(film.scanlines);
}

#[test]
fn names_parse_case_insensitively() {
    for aesthetic in Aesthetic::ALL {
        assert_eq!(aesthetic.name().to_uppercase().parse::<Aesthetic>(), Ok(aesthetic));
    }
    assert!("vaporwave".parse::<Aesthetic>().is_err());
}
