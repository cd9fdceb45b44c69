// src/extractors/test_fixtures.rs

/// A trimmed weekly schedule page: three days (one a weekend with a cut-down
/// header), a deadline in the info row, changed and cancelled lessons, an
/// all-day event, blocks that must be dropped and a content-only block.
pub(crate) const WEEK_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
<title>Jane Doe(k), 2a - Skema</title>
<script type="text/javascript">var x = "<div class='s2skemabrik'>";</script>
</head>
<body>
<div class="ls-master-header-institution-name">Testby Gymnasium</div>
<!-- <div class="s2skemabrik" data-tooltip="Hold: Hidden"></div> -->
<input id="s_m_Content_Content_SkemaMedNavigation_datePicker_tb" type="text" value="4/3-2024 - 10/3-2024"/>
<table class="s2skema">
<tr class="s2weekHeader"><td colspan="4">Uge 10 - 2024</td></tr>
<tr class="s2dayHeader">
<td>Modul</td>
<td>Mandag (4/3)</td>
<td>Tirsdag (5/3)</td>
<td>rdag (9/3)</td>
</tr>
<tr>
<td class="s2infoHeader"></td>
<td class="s2infoHeader"><a class="s2skemabrik s2bgbox" data-tooltip="Afleveringsfrist: Dansk opgave
4/3-2024 Hele dagen">Aflevering</a></td>
<td class="s2infoHeader"></td>
<td class="s2infoHeader"></td>
</tr>
<tr>
<td>
<div class="s2module-info"><div>1. modul<br/>8:10 - 9:40</div></div>
<div class="s2module-info"><div>2. modul<br/>10:00 - 11:30</div></div>
<div class="s2module-info"><div>broken</div></div>
<div class="s2module-info"><div>3. modul<br/>12:10 - 13:40</div></div>
</td>
<td data-date="2024-03-04">
<a class="s2skemabrik s2bgbox" data-brikid="ABS1001" style="left:0%; top:0.5em; width:100%" data-tooltip="Romantikken
4/3-2024 08:10 til 09:40
Hold: 2a Dansk
Lærer: Anne Berg (AB)
Lokale: 12
Lektier:
- Læs s. 10-20
- Svar på spørgsmål
Note:
Husk bogen"><div class="s2skemabrikcontent">2a Dansk • AB • 12</div></a>
<a class="s2skemabrik s2bgbox s2changed" data-brikid="ABS1002" style="left:0%; top:10em; width:100%" data-tooltip="Hold: 2a Matematik
4/3-2024 12:10 til 13:40
Lærer: John Smith (JSM)
Lokale: 101"><div class="s2skemabrikcontent">2a Matematik • JSM • 101</div></a>
<a class="s2skemabrik s2bgbox" data-brikid="ABS1003" style="left:0%; top:19em; width:100%" data-tooltip="Hold: 2a Fysik
5/3-2024 14:00 til 15:30"></a>
<a class="s2skemabrik s2bgbox" data-brikid="ABS1004" data-tooltip="Lokale: 3"></a>
</td>
<td data-date="2024-03-05">
<a class="s2skemabrik s2bgbox s2cancelled" data-brikid="ABS2001" data-tooltip="Hold: 2a Engelsk
5/3-2024 10:00 til 11:30
Lærer: Mary Lee (ML)
Lektier:
- Read chapter 3"></a>
<a class="s2skemabrik s2bgbox" data-brikid="ABS2002" data-tooltip="Idrætsdag
5/3-2024 Hele dagen"></a>
<a class="s2skemabrik s2bgbox" data-brikid="ABS2003" style="left:0%; top:20em; width:100%" data-tooltip="5/3-2024 14:00 til 15:30"><div class="s2skemabrikcontent">2a Kemi • KL • 204 • Syrer</div></a>
</td>
<td data-date="2024-03-09"></td>
</tr>
</table>
<table id="s_m_Content_Content_holdElementLinkList">
<tr><th>Hold:</th><td><a href="#">2a Dansk</a>, <a href="#">2a Matematik</a></td></tr>
<tr><th>Indb. grupper:</th><td><a href="#">Kor</a></td></tr>
<tr><th>Egne grupper:</th><td><a href="#">Studiegruppe</a></td></tr>
</table>
</body>
</html>
"##;
