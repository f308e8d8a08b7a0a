//! Copy-paste client snippet for adding a gateway login button to a React app

use crate::gateway::SupportedService;

/// `LoginWith<FriendlyName>`, keeping only word characters of the name
pub fn component_name(service: &SupportedService) -> String {
    let name: String = service
        .friendly_service_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    format!("LoginWith{}", name)
}

pub fn example_usage(app_id: &str, service: &SupportedService) -> String {
    let component = component_name(service);
    let friendly = &service.friendly_service_name;
    let slug = &service.slug;

    format!(
        r#"import OneGraphAuth from "onegraph-auth";

const auth = new OneGraphAuth({{
  appId: "{app_id}",
}});

/* Usage:
  <{component} oneGraphAuth={{auth}} onLogin={{() => console.log("User has successfully logged into {friendly}.")}} />
*/
const {component} = ({{ oneGraphAuth, onLogin }}) => {{
  return (
    <button
      onClick={{async () => {{
        await oneGraphAuth.login("{slug}");
        const isLoggedIn = await oneGraphAuth.isLoggedIn("{slug}");
        if (isLoggedIn) {{
          onLogin();
        }}
      }}}}
    >
      Log in with {friendly}
    </button>
  );
}};"#
    )
}
