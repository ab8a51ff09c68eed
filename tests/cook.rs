// tests/cook.rs

//! End-to-end cook tests against recording collaborators.

mod common;

use common::{FakeFetcher, RecordingRunner, test_kitchen};
use glfw_recipe::options::FPIC;
use glfw_recipe::recipe::info::MANIFEST_FILE;
use glfw_recipe::recipe::kitchen::cmake::CMake;
use glfw_recipe::{
    Error, OptionSet, Os, PackageManifest, Recipe, Requirement, Settings,
};
use std::fs;
use std::sync::Arc;

fn requirement_strings(requirements: &[Requirement]) -> Vec<String> {
    requirements.iter().map(ToString::to_string).collect()
}

#[test]
fn test_linux_static_cook() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(RecordingRunner::new(&["libglfw3.a"]));
    let (_temp, kitchen) = test_kitchen(fetcher.clone(), runner.clone());

    let recipe = Recipe::new(Settings::for_os(Os::Linux), OptionSet::default());
    let result = kitchen.cook(recipe).unwrap();

    assert_eq!(
        requirement_strings(&result.requirements),
        vec!["opengl/system", "xorg/system"]
    );
    assert_eq!(fetcher.fetch_count(), 1);

    // Configure, build, install: one of each
    assert_eq!(runner.cmake_calls("-S").len(), 1);
    assert_eq!(runner.cmake_calls("--build").len(), 1);
    assert_eq!(runner.cmake_calls("--install").len(), 1);
    assert!(runner.calls_to("install_name_tool").is_empty());

    let configure = &runner.cmake_calls("-S")[0].args;
    assert!(configure.contains(&"-DCMAKE_POSITION_INDEPENDENT_CODE=ON".to_string()));
    assert!(configure.contains(&"-DBUILD_SHARED_LIBS=OFF".to_string()));
    assert!(configure.contains(&"-DGLFW_BUILD_EXAMPLES=OFF".to_string()));
    assert!(configure.contains(&"-DCMAKE_POLICY_VERSION_MINIMUM=3.5".to_string()));
    assert!(!configure.iter().any(|a| a.starts_with("-DUSE_MSVC_RUNTIME_LIBRARY_DLL")));

    assert_eq!(result.cpp_info.libs, vec!["glfw3"]);
    assert_eq!(result.cpp_info.system_libs, vec!["m", "pthread", "dl", "rt"]);
    assert!(result.cpp_info.frameworks.is_empty());
    assert_eq!(result.cpp_info.pkg_config_name(), Some("glfw3"));

    let manifest = PackageManifest::load(&result.layout.package_dir).unwrap();
    assert_eq!(manifest.reference, "glfw/3.3.2");
    assert_eq!(manifest.package_id, result.package_id);
    assert_eq!(manifest.options.get(FPIC), Some(&true));
    assert_eq!(result.manifest_path, result.layout.package_dir.join(MANIFEST_FILE));
}

#[test]
fn test_windows_cook_has_no_fpic() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(RecordingRunner::new(&["glfw3.lib"]));
    let (_temp, kitchen) = test_kitchen(fetcher, runner.clone());

    let recipe = Recipe::new(Settings::for_os(Os::Windows), OptionSet::default());
    let result = kitchen.cook(recipe).unwrap();

    assert_eq!(requirement_strings(&result.requirements), vec!["opengl/system"]);

    let configure = &runner.cmake_calls("-S")[0].args;
    assert!(configure.contains(&"-DUSE_MSVC_RUNTIME_LIBRARY_DLL=ON".to_string()));
    assert!(!configure.iter().any(|a| a.starts_with("-DCMAKE_POSITION_INDEPENDENT_CODE")));
    assert!(configure.windows(2).any(|w| w == ["-A", "x64"]));

    let manifest = PackageManifest::load(&result.layout.package_dir).unwrap();
    assert!(!manifest.options.contains_key(FPIC));
    assert_eq!(result.cpp_info.libs, vec!["glfw3"]);
    assert!(result.cpp_info.system_libs.is_empty());
    assert!(result.cpp_info.frameworks.is_empty());
}

#[test]
fn test_macos_shared_fixes_every_dylib() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(
        RecordingRunner::new(&["libglfw.3.3.dylib", "libglfw.3.dylib", "libglfw.dylib"])
            .with_build_outputs(&["libglfw.3.3.dylib", "libglfw.3.dylib", "libglfw.dylib"]),
    );
    let (_temp, kitchen) = test_kitchen(fetcher, runner.clone());

    let mut options = OptionSet::default();
    options.shared = true;
    let recipe = Recipe::new(Settings::for_os(Os::Macos), options);
    let result = kitchen.cook(recipe).unwrap();

    let fixes = runner.calls_to("install_name_tool");
    assert_eq!(fixes.len(), 3);
    let lib_dir = result.layout.build_subfolder().join("src");
    for (fix, name) in fixes
        .iter()
        .zip(["libglfw.3.3.dylib", "libglfw.3.dylib", "libglfw.dylib"])
    {
        assert_eq!(fix.args, vec!["-id", name, name]);
        assert_eq!(fix.cwd.as_deref(), Some(lib_dir.as_path()));
    }

    let manifest = PackageManifest::load(&result.layout.package_dir).unwrap();
    assert!(!manifest.options.contains_key(FPIC));
    assert_eq!(result.cpp_info.libs, vec!["glfw"]);
    assert_eq!(
        result.cpp_info.frameworks,
        vec!["Cocoa", "IOKit", "CoreFoundation"]
    );
    assert!(result.cpp_info.system_libs.is_empty());
}

#[test]
fn test_macos_static_skips_install_names() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(RecordingRunner::new(&["libglfw3.a"]).with_build_outputs(&["libglfw3.a"]));
    let (_temp, kitchen) = test_kitchen(fetcher, runner.clone());

    let recipe = Recipe::new(Settings::for_os(Os::Macos), OptionSet::default());
    kitchen.cook(recipe).unwrap();

    assert!(runner.calls_to("install_name_tool").is_empty());
}

#[test]
fn test_build_handle_configured_once() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(RecordingRunner::new(&[]));
    let (_temp, kitchen) = test_kitchen(fetcher, runner.clone());

    let recipe = Recipe::configured(Settings::for_os(Os::Linux), OptionSet::default());
    let mut cook = kitchen.prepare(&recipe);
    assert!(!cook.has_build_handle());

    let first: *const CMake = cook.configure_cmake().unwrap();
    let second: *const CMake = cook.configure_cmake().unwrap();

    assert_eq!(first, second);
    assert!(cook.has_build_handle());
    assert_eq!(runner.cmake_calls("-S").len(), 1);
}

#[test]
fn test_build_and_package_share_one_configure() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(RecordingRunner::new(&["libglfw3.a"]));
    let (_temp, kitchen) = test_kitchen(fetcher, runner.clone());

    let recipe = Recipe::configured(Settings::for_os(Os::Linux), OptionSet::default());
    let mut cook = kitchen.prepare(&recipe);
    cook.source().unwrap();
    cook.package().unwrap();
    cook.build().unwrap();

    assert_eq!(runner.cmake_calls("-S").len(), 1);
    assert_eq!(runner.cmake_calls("--install").len(), 1);
    assert_eq!(runner.cmake_calls("--build").len(), 1);
}

#[test]
fn test_package_layout() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(RecordingRunner::new(&["libglfw3.a"]));
    let (_temp, kitchen) = test_kitchen(fetcher, runner);

    let recipe = Recipe::new(Settings::for_os(Os::Linux), OptionSet::default());
    let result = kitchen.cook(recipe).unwrap();
    let package = &result.layout.package_dir;

    assert!(package.join("licenses/LICENSE.md").is_file());
    assert!(package.join("include/GLFW/glfw3.h").is_file());
    assert!(package.join("lib/libglfw3.a").is_file());
    assert!(!package.join("lib/cmake").exists());
    assert!(!package.join("lib/pkgconfig").exists());
}

#[test]
fn test_source_substitutes_wrapper() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(RecordingRunner::new(&[]));
    let (_temp, kitchen) = test_kitchen(fetcher.clone(), runner);

    let recipe = Recipe::configured(Settings::for_os(Os::Linux), OptionSet::default());
    let mut cook = kitchen.prepare(&recipe);
    cook.source().unwrap();

    let subfolder = cook.layout().source_subfolder();
    let wrapper = fs::read_to_string(subfolder.join("CMakeLists.txt")).unwrap();
    assert!(wrapper.contains("CMakeLists_original.txt"));
    let original = fs::read_to_string(subfolder.join("CMakeLists_original.txt")).unwrap();
    assert!(original.contains("project(GLFW C)"));

    let fetches = fetcher.fetches.lock().unwrap();
    assert_eq!(fetches[0].url, "https://github.com/glfw/glfw/archive/3.3.2.zip");
    assert_eq!(fetches[0].filename, "glfw-3.3.2.zip");
    assert_eq!(fetches[0].sha256, None);
}

#[test]
fn test_cached_sources_are_reused() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(RecordingRunner::new(&["libglfw3.a"]));
    let (_temp, kitchen) = test_kitchen(fetcher.clone(), runner);

    let static_build = Recipe::new(Settings::for_os(Os::Linux), OptionSet::default());
    let mut options = OptionSet::default();
    options.shared = true;
    let shared_build = Recipe::new(Settings::for_os(Os::Linux), options);

    let first = kitchen.cook(static_build).unwrap();
    let second = kitchen.cook(shared_build).unwrap();

    assert_eq!(fetcher.fetch_count(), 1);
    assert_ne!(first.package_id, second.package_id);
    assert_ne!(first.layout.package_dir, second.layout.package_dir);
    assert_eq!(first.layout.source_dir, second.layout.source_dir);
}

#[test]
fn test_interrupted_source_is_fetched_again() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(RecordingRunner::new(&[]));
    let (_temp, kitchen) = test_kitchen(fetcher.clone(), runner);

    let recipe = Recipe::configured(Settings::for_os(Os::Linux), OptionSet::default());
    let mut cook = kitchen.prepare(&recipe);
    cook.source().unwrap();

    // Upstream file moved aside but the wrapper never written
    let subfolder = cook.layout().source_subfolder();
    fs::remove_file(subfolder.join("CMakeLists.txt")).unwrap();
    assert!(subfolder.join("CMakeLists_original.txt").is_file());

    let mut cook = kitchen.prepare(&recipe);
    cook.source().unwrap();

    assert_eq!(fetcher.fetch_count(), 2);
    let wrapper = fs::read_to_string(subfolder.join("CMakeLists.txt")).unwrap();
    assert!(wrapper.contains("CMakeLists_original.txt"));
}

#[test]
fn test_missing_license_fails_package() {
    struct NoLicenseFetcher;

    impl glfw_recipe::recipe::kitchen::archive::SourceFetcher for NoLicenseFetcher {
        fn fetch(
            &self,
            _source: &glfw_recipe::recipe::kitchen::archive::SourceSpec,
            dest: &std::path::Path,
        ) -> glfw_recipe::Result<()> {
            let root = dest.join("glfw-3.3.2");
            fs::create_dir_all(&root)?;
            fs::write(root.join("CMakeLists.txt"), "project(GLFW C)\n")?;
            Ok(())
        }
    }

    let temp = tempfile::tempdir().unwrap();
    let runner = Arc::new(RecordingRunner::new(&[]));
    let kitchen = glfw_recipe::Kitchen::with_collaborators(
        glfw_recipe::KitchenConfig::with_cache_dir(temp.path()),
        Arc::new(NoLicenseFetcher),
        runner.clone(),
        Arc::new(glfw_recipe::recipe::kitchen::files::LocalFiles),
    );

    let recipe = Recipe::new(Settings::for_os(Os::Linux), OptionSet::default());
    let err = kitchen.cook(recipe).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(runner.cmake_calls("--install").is_empty());
}

#[test]
fn test_load_manifest_after_cook() {
    let fetcher = Arc::new(FakeFetcher::default());
    let runner = Arc::new(RecordingRunner::new(&["libglfw3.a"]));
    let (_temp, kitchen) = test_kitchen(fetcher, runner);

    let settings = Settings::for_os(Os::Linux);
    let recipe = Recipe::configured(settings.clone(), OptionSet::default());
    assert!(kitchen.load_manifest(&recipe).is_err());

    kitchen
        .cook(Recipe::new(settings, OptionSet::default()))
        .unwrap();
    let manifest = kitchen.load_manifest(&recipe).unwrap();
    assert_eq!(manifest.package_id, recipe.package_id());
    assert_eq!(
        requirement_strings(&manifest.requires),
        vec!["opengl/system", "xorg/system"]
    );
}
