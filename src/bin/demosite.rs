//! A small demonstration site: a manual section which itself embeds a
//! glossary, plus a notes section, both mounted into the site's route
//! space and rendering through the site's page shell.

use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use clap::Parser as ClapParser;
use kstring::KString;
use lazy_static::lazy_static;

use subsite::acontext::AContext;
use subsite::apachelog::Logs;
use subsite::aresponse::AResponse;
use subsite::capability::PageShell;
use subsite::grammar::Grammar;
use subsite::http_request_method::MethodSet;
use subsite::http_response_status_codes::HttpResponseStatusCode;
use subsite::pattern::Var;
use subsite::rouille_runner::{Tlskeys, run_server};
use subsite::sitemap::{SiteMap, SiteRoot};
use subsite::subsite::{Mount, Subsite, SubsiteContext};
use subsite::webutils::errorpage_from_status;


// ------------------------------------------------------------------
// The glossary bundle, mounted inside the manual.

struct Glossary {
    terms: Vec<(&'static str, &'static str)>,
}

#[derive(Debug, Clone, PartialEq)]
enum GlossaryRoute {
    Index,
    Term(KString),
}

fn glossary_grammar() -> Result<Grammar<GlossaryRoute>> {
    let mut g = Grammar::new();
    g
        .add("index", "/", MethodSet::get(),
             |_| Some(GlossaryRoute::Index),
             |r| matches!(r, GlossaryRoute::Index).then(Vec::new))?
        .add("term", "/term/{str}", MethodSet::get(),
             |vars| Some(GlossaryRoute::Term(
                 KString::from_ref(vars.first()?.as_str()?))),
             |r| match r {
                 GlossaryRoute::Term(name) => Some(vec![Var::Str(name.clone())]),
                 _ => None
             })?;
    Ok(g)
}

impl<H: PageShell + 'static> Subsite<H> for Glossary {
    type Route = GlossaryRoute;
    fn handle(
        &self,
        context: &SubsiteContext<'_, H, Self>,
        route: GlossaryRoute,
    ) -> Result<AResponse> {
        match route {
            GlossaryRoute::Index => {
                let mut items = String::new();
                for (term, _) in &self.terms {
                    let href = context.href(
                        &GlossaryRoute::Term(KString::from_ref(term)))?;
                    items.push_str(&format!(
                        "<li><a href=\"{href}\">{term}</a></li>"));
                }
                context.page(Some("Glossary"),
                             &format!("<h1>Glossary</h1><ul>{items}</ul>"))
            }
            GlossaryRoute::Term(name) => {
                match self.terms.iter().find(|(term, _)| *term == name.as_str()) {
                    Some(&(term, explanation)) => context.page(
                        Some(term),
                        &format!("<h1>{term}</h1><p>{explanation}</p>")),
                    None => Ok(errorpage_from_status(
                        HttpResponseStatusCode::NotFound404).into())
                }
            }
        }
    }
}


// ------------------------------------------------------------------
// The manual bundle; mounts the glossary below itself.

struct Manual {
    chapters: Vec<(&'static str, &'static str)>,
    glossary: Glossary,
}

#[derive(Debug, Clone, PartialEq)]
enum ManualRoute {
    Index,
    Chapter(KString),
    Glossary(GlossaryRoute),
}

fn manual_map<H: PageShell + 'static>() -> Result<SiteMap<H, Manual>> {
    let mut g = Grammar::new();
    g
        .add("index", "/", MethodSet::get(),
             |_| Some(ManualRoute::Index),
             |r| matches!(r, ManualRoute::Index).then(Vec::new))?
        .add("chapter", "/chapter/{str}", MethodSet::get(),
             |vars| Some(ManualRoute::Chapter(
                 KString::from_ref(vars.first()?.as_str()?))),
             |r| match r {
                 ManualRoute::Chapter(name) => Some(vec![Var::Str(name.clone())]),
                 _ => None
             })?;
    let mut m = SiteMap::new(g);
    m.mount(Mount::new(
        "/glossary",
        ManualRoute::Glossary,
        |r| match r {
            ManualRoute::Glossary(g) => Some(g.clone()),
            _ => None
        },
        |manual: &Manual| &manual.glossary,
        Arc::new(SiteMap::new(glossary_grammar()?)),
    )?)?;
    Ok(m)
}

impl<H: PageShell + 'static> Subsite<H> for Manual {
    type Route = ManualRoute;
    fn handle(
        &self,
        context: &SubsiteContext<'_, H, Self>,
        route: ManualRoute,
    ) -> Result<AResponse> {
        match route {
            ManualRoute::Index => {
                let mut items = String::new();
                for (name, title) in &self.chapters {
                    let href = context.href(
                        &ManualRoute::Chapter(KString::from_ref(name)))?;
                    items.push_str(&format!(
                        "<li><a href=\"{href}\">{title}</a></li>"));
                }
                let glossary = context.href(
                    &ManualRoute::Glossary(GlossaryRoute::Index))?;
                context.page(
                    Some("Manual"),
                    &format!("<h1>Manual</h1><ul>{items}</ul>\
                              <p><a href=\"{glossary}\">Glossary</a></p>"))
            }
            ManualRoute::Chapter(name) => {
                match self.chapters.iter().find(
                    |(chapter, _)| *chapter == name.as_str())
                {
                    Some(&(_, title)) => context.page(
                        Some(title),
                        &format!("<h1>{title}</h1><p>(chapter text)</p>")),
                    None => Ok(errorpage_from_status(
                        HttpResponseStatusCode::NotFound404).into())
                }
            }
            ManualRoute::Glossary(_) => Err(anyhow!(
                "glossary routes are handled by the mount, got {route:?}")),
        }
    }
}


// ------------------------------------------------------------------
// The notes bundle.

struct Notes {
    notes: Vec<(u64, &'static str)>,
}

#[derive(Debug, Clone, PartialEq)]
enum NoteRoute {
    Index,
    Note(u64),
}

fn notes_map<H: PageShell + 'static>() -> Result<SiteMap<H, Notes>> {
    let mut g = Grammar::new();
    g
        .add("index", "/", MethodSet::get(),
             |_| Some(NoteRoute::Index),
             |r| matches!(r, NoteRoute::Index).then(Vec::new))?
        .add("note", "/{u64}", MethodSet::get(),
             |vars| Some(NoteRoute::Note(vars.first()?.as_u64()?)),
             |r| match r {
                 NoteRoute::Note(id) => Some(vec![Var::U64(*id)]),
                 _ => None
             })?;
    Ok(SiteMap::new(g))
}

impl<H: PageShell + 'static> Subsite<H> for Notes {
    type Route = NoteRoute;
    fn handle(
        &self,
        context: &SubsiteContext<'_, H, Self>,
        route: NoteRoute,
    ) -> Result<AResponse> {
        match route {
            NoteRoute::Index => {
                let mut items = String::new();
                for (id, text) in &self.notes {
                    let href = context.href(&NoteRoute::Note(*id))?;
                    items.push_str(&format!(
                        "<li><a href=\"{href}\">note {id}</a>: {text}</li>"));
                }
                context.page(Some("Notes"),
                             &format!("<h1>Notes</h1><ul>{items}</ul>"))
            }
            NoteRoute::Note(id) => {
                match self.notes.iter().find(|(note_id, _)| *note_id == id) {
                    Some((_, text)) => context.page(
                        Some(&format!("Note {id}")),
                        &format!("<h1>Note {id}</h1><p>{text}</p>")),
                    None => Ok(errorpage_from_status(
                        HttpResponseStatusCode::NotFound404).into())
                }
            }
        }
    }
}


// ------------------------------------------------------------------
// The site itself.

struct DemoSite {
    name: &'static str,
    // (label, href) pairs, hrefs derived from NAV's route values
    nav: Vec<(&'static str, String)>,
    manual: Manual,
    notes: Notes,
}

#[derive(Debug, Clone, PartialEq)]
enum DemoRoute {
    Home,
    About,
    Manual(ManualRoute),
    Notes(NoteRoute),
}

lazy_static! {
    static ref NAV: Vec<(&'static str, DemoRoute)> = vec![
        ("Home", DemoRoute::Home),
        ("Manual", DemoRoute::Manual(ManualRoute::Index)),
        ("Notes", DemoRoute::Notes(NoteRoute::Index)),
        ("About", DemoRoute::About),
    ];
}

impl PageShell for DemoSite {
    fn render_shell(
        &self,
        context: &AContext,
        head_title: Option<&str>,
        main: &str,
    ) -> Result<String> {
        let title = match head_title {
            Some(t) => format!("{t} - {}", self.name),
            None => self.name.to_string()
        };
        let mut nav = String::new();
        for (label, href) in &self.nav {
            nav.push_str(&format!(" <a href=\"{href}\">{label}</a>"));
        }
        Ok(format!(
            "<!DOCTYPE html><html><head><title>{title}</title></head>\
             <body><p>{nav}</p>{main}\
             <hr><small>served {}</small></body></html>\n",
            context.host_or_listen_addr()))
    }

    fn site_name(&self) -> &str {
        self.name
    }
}

impl Subsite<DemoSite> for DemoSite {
    type Route = DemoRoute;
    fn handle(
        &self,
        context: &SubsiteContext<'_, DemoSite, Self>,
        route: DemoRoute,
    ) -> Result<AResponse> {
        match route {
            DemoRoute::Home => context.page(
                None,
                &format!("<h1>{}</h1><p>A site made of mounted \
                          parts.</p>", self.name)),
            DemoRoute::About => context.page(
                Some("About"),
                "<h1>About</h1><p>Routes are values; links are \
                 derived, not typed out.</p>"),
            _ => Err(anyhow!(
                "mounted routes are handled by their mounts, got {route:?}")),
        }
    }
}

fn demo_map() -> Result<SiteRoot<DemoSite>> {
    let mut g = Grammar::new();
    g
        .add("home", "/", MethodSet::get(),
             |_| Some(DemoRoute::Home),
             |r| matches!(r, DemoRoute::Home).then(Vec::new))?
        .add("about", "/about", MethodSet::get(),
             |_| Some(DemoRoute::About),
             |r| matches!(r, DemoRoute::About).then(Vec::new))?;
    let mut m = SiteMap::new(g);
    m
        .mount(Mount::new(
            "/manual",
            DemoRoute::Manual,
            |r| match r {
                DemoRoute::Manual(m) => Some(m.clone()),
                _ => None
            },
            |site: &DemoSite| &site.manual,
            Arc::new(manual_map()?),
        )?)?
        .mount(Mount::new(
            "/notes",
            DemoRoute::Notes,
            |r| match r {
                DemoRoute::Notes(n) => Some(n.clone()),
                _ => None
            },
            |site: &DemoSite| &site.notes,
            Arc::new(notes_map()?),
        )?)?;
    Ok(m)
}

fn demo_site(root: &SiteRoot<DemoSite>) -> Result<DemoSite> {
    let mut nav = Vec::new();
    for (label, route) in NAV.iter() {
        nav.push((*label, root.href(route)?));
    }
    Ok(DemoSite {
        name: "Demo Site",
        nav,
        manual: Manual {
            chapters: vec![
                ("intro", "Introduction"),
                ("mounting", "Mounting parts"),
            ],
            glossary: Glossary {
                terms: vec![
                    ("route", "A value naming one page of the site."),
                    ("mount", "A part attached below a path prefix."),
                ],
            },
        },
        notes: Notes {
            notes: vec![
                (1, "first note"),
                (2, "second note"),
            ],
        },
    })
}


#[derive(clap::Parser, Debug)]
/// Serve the demonstration site.
struct Args {
    /// Address to listen on
    #[clap(long, default_value = "127.0.0.1:8000")]
    listen: String,

    /// Directory to write access and error logs to
    #[clap(long, default_value = ".")]
    logdir: String,

    /// Base path of TLS key files; reads BASE.crt and BASE.key and
    /// serves https instead of http
    #[clap(long)]
    tlsbase: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let tlskeys = args.tlsbase.as_ref().map(
        |base| -> Result<_> {
            Ok(Tlskeys {
                crt: std::fs::read(format!("{base}.crt"))?,
                key: std::fs::read(format!("{base}.key"))?,
            })
        }).transpose()?;
    let is_https = tlskeys.is_some();

    let root = Arc::new(demo_map()?);
    let site = Arc::new(demo_site(&root)?);
    let logs: Arc<Mutex<Logs>> = Logs::open_in_basedir(&args.logdir, is_https)?;

    eprintln!("Listening on {} ({}), logging to {:?}",
              args.listen,
              if is_https { "https" } else { "http" },
              args.logdir);
    run_server("demosite", args.listen, tlskeys, site, root, logs)?
        .join()
        .map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}
